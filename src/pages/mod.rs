pub mod calculator;
pub mod simulator;

pub use calculator::CalculatorPage;
pub use simulator::SimulatorPage;
