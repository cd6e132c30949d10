pub mod contact;
pub mod letter;
