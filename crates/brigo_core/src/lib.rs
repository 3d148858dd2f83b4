pub mod domain;
pub mod ports;
pub mod retry;
pub mod store;

pub use domain::{
    AuthUser, Material, MaterialInput, MaterialKind, NewNotebook, Notebook, NotebookStatus,
    NotebookUpdate, UserCredentials,
};
pub use ports::{AccountService, IdentityProvider, NotebookService, PortError, PortResult};
pub use retry::{with_retry, RetryPolicy};
pub use store::{LoadState, NotebookStore};
