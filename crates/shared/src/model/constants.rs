use const_format::concatcp;

pub const SLOT_PREFIX: &str = "gym-";
/// Slot holding the serialized routine collection
pub const ROUTINES_SLOT: &str = concatcp!(SLOT_PREFIX, "routines");
/// Slot holding the session display name
pub const SESSION_SLOT: &str = concatcp!(SLOT_PREFIX, "app-user");

pub const MIN_SETS: u32 = 1;
pub const MIN_REPS: u32 = 1;
