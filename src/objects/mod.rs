//! Non-graphical objects (OBJECTS section)

pub mod spatial_index;
