pub mod google;
pub mod rating;
pub mod session;
pub mod signup;
