//! Traits implemented by credential backends

mod database;

pub use database::{
    ChangeExpiration, ChangePassword, Database, DeleteUserRequest, DeleteUserResponse,
    InitializeRequest, InitializeResponse, NewUserRequest, NewUserResponse, Statements,
    UpdateUserRequest, UpdateUserResponse, UsernameMetadata,
};
