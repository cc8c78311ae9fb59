pub mod build;
pub mod event;
pub mod tester;

pub use build::BuildMetadata;
pub use event::{
    is_valid_event, validate_shape, AppInfo, EventRejection, InboundEvent, Platform, Release,
    ReleaseEvent, ReleaseEventKind, ReleaseNotes, RELEASE_CREATED, RELEASE_UPDATED,
};
pub use tester::TesterGroup;
