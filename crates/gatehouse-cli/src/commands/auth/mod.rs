//! Account and session commands.

pub mod login;
pub mod logout;
pub mod signup;
pub mod whoami;

pub use login::LoginArgs;
pub use logout::LogoutArgs;
pub use signup::SignupArgs;
pub use whoami::WhoamiArgs;
