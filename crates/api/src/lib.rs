//! JSON wire types shared by the path store service and its clients.

pub mod v1;
