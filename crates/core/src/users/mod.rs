//! Users module - the credential store.

mod users_model;
mod users_repository;
mod users_service;
mod users_traits;


pub use users_model::{NewUser, User, UserError, UserRole, MIN_PASSWORD_LEN};
pub use users_repository::UserRepository;
pub use users_service::UserService;
pub use users_traits::{UserRepositoryTrait, UserServiceTrait};
