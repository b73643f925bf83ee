#![no_main]

use classweave::prelude::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let context = ClassFile::new();
    if let Ok(model) = context.parse(data) {
        if let Ok(output) = context.transform_class(&model, pass_through()) {
            assert!(context.parse(&output).is_ok());
        }
    }
});
