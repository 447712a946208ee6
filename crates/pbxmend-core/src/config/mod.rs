pub mod settings;

pub use settings::PbxConfig;
