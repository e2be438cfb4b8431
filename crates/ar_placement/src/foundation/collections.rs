//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle to a placed object
    ///
    /// A handle to a deleted object never resolves again, even if its slot
    /// is reused, so gesture sessions cannot act on a stale target.
    pub struct ObjectId;
}

/// Handle-based map for placed objects
pub type ObjectMap<T> = SlotMap<ObjectId, T>;
