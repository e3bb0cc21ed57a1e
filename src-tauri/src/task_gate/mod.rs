//! 单飞任务闸门模块
//!
//! 按任务键对并发调用去重，保证同一个键同一时刻最多只有一个执行中的操作
//!
//! # 使用方法
//!
//! ```
//! use focuskeeper_lib::task_gate::{GateOutcome, TaskGate};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gate = TaskGate::new();
//! let outcome = gate.run("start-session", || async { 42 }).await;
//! assert_eq!(outcome, GateOutcome::Completed(42));
//! # }
//! ```

mod gate;

pub use gate::{GateOutcome, GatePolicy, TaskGate};
