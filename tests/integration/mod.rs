#![allow(missing_docs)]

mod manager;
mod sampler;
mod settings;
