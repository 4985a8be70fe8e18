mod arc;
mod clock;

pub use {arc::ArcReplacer, clock::ClockReplacer};
