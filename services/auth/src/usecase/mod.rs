pub mod google;
pub mod password;
pub mod rating;
pub mod signup;
pub mod token;
