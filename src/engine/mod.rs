pub mod crashdump;
pub mod factory;
pub mod level_by_level;
pub mod outputs;

pub use crashdump::CrashReport;
pub use factory::EngineFactory;
pub use level_by_level::LevelByLevelEngine;
pub use outputs::RunOutputs;
