mod slot_list;

pub(crate) use slot_list::{SlotId, SlotList};
