pub mod directory;
pub mod domain;
pub mod gate;
mod ids;
pub mod identity;
pub mod memory;
pub mod persistence;
pub mod portal;
pub mod ports;
pub mod store;
pub mod views;

pub use directory::IdentityDirectory;
pub use domain::{
    Account, Assignment, AssignmentPatch, FileBlob, FileDescriptor, Identity, NewAccount,
    NewAssignment, NewSubmission, Notice, NoticeKind, Role, Submission, SubmissionPatch,
    SubmissionStatus, UploadedFile,
};
pub use gate::{authorize, check_path, GateDecision, PathDecision, LOGIN_PATH};
pub use identity::IdentityStore;
pub use memory::InMemoryKeyValueStore;
pub use persistence::Persistence;
pub use portal::Portal;
pub use ports::{
    FileTransferService, KeyValueStore, Notifier, PasswordHasher, PortError, PortResult,
};
pub use store::DomainStore;
