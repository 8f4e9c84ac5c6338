//! Types shared between the tic-tac-toe server and its clients.

pub mod models;
pub mod protocol;
