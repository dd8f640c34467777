pub mod climate;
pub mod flies;
pub mod geometry;
pub mod network;
pub mod services;
pub mod shape;
pub mod solar;
pub mod table;
