mod issuer;
mod validator;

pub use issuer::{IssuedToken, TokenIssuer};
pub use validator::{TokenValidation, TokenValidator};
