#![no_main]
use libfuzzer_sys::fuzz_target;

use gridtrace_model::RunTrace;
use gridtrace_smt::encoder::{
    encode_loop_freedom, encode_nearest_goal, encode_path_efficiency, encode_validity,
    NearestGoalMetric,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Decoding must never panic, and anything it accepts must encode.
        if let Ok(trace) = RunTrace::from_json(s) {
            let _ = trace.fingerprint();
            let _ = encode_validity(&trace).expect("validated runs encode");
            let _ = encode_loop_freedom(&trace).expect("validated runs encode");
            let _ = encode_path_efficiency(&trace).expect("validated runs encode");
            let _ = encode_nearest_goal(&trace, NearestGoalMetric::Manhattan)
                .expect("validated runs encode");
        }
    }
});
