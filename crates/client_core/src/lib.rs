pub mod admin;
pub mod controller;
pub mod draft;
pub mod error;
pub mod render;
pub mod service;
pub mod store;
pub mod view;

pub use admin::{AdminConsole, DeleteTarget};
pub use controller::{EnrollmentController, EnrollmentPrompt, PageSurface, Trigger};
pub use error::{ClientError, ClientResult};
pub use service::{AdminService, EventService, HttpEventService};
pub use store::{FileIdentityStore, IdentityStore, MemoryIdentityStore};
pub use view::{EnrollAction, TypeFilter, ViewFilter};
