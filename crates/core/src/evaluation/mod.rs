pub mod eval_logger;
pub mod evaluate_runtime_use_case;
pub mod evaluation_output;
