pub mod api_reference;
pub mod discover;
pub mod home;
pub mod signup;
