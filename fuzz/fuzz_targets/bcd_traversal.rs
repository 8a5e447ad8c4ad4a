#![no_main]

use compatscan::near_duplicates::find_near_duplicates;
use compatscan::source::BcdSource;
use compatscan::{Traversal, TraversalConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary documents must produce records or errors, never panic
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(source) = BcdSource::from_json_str(input) {
            let traversal = Traversal::new(&source, TraversalConfig::default());
            for statement in traversal.statements() {
                let _ = statement;
            }
            let notes: Vec<_> = traversal.notes().filter_map(Result::ok).take(64).collect();
            let _ = find_near_duplicates(&notes, "chrome", 5);
        }
    }
});
