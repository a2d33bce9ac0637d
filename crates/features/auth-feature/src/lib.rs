pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthFeatureError;
pub use service::{
    AuthService, AuthSession, LoginInput, RegisterInput, UpdateProfileInput, UserProfile,
};
pub use token::{Claims, TokenPair, TokenService};
