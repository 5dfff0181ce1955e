//! Screen reader support module

pub mod announcer;
pub mod live_region;

pub use announcer::{AnnouncementRequest, Announcer};
pub use live_region::{
    AnnouncementPriority, LiveRegion, LiveRegionMutation, LiveRegionSink, RecordingSink,
};
