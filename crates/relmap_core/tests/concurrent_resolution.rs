use relmap_core::convert::standard::true_false;
use relmap_core::model::sql_types;
use relmap_core::{TypeConfiguration, TypeReference, TypeSettings};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn concurrent_first_use_converges_on_one_type() {
    let settings =
        TypeSettings::from_json_str(r#"{ "register_standard_types": false }"#).expect("settings");
    let configuration =
        Arc::new(TypeConfiguration::from_settings(&settings).expect("configuration"));
    let reference = TypeReference::with_converter("t_or_f", sql_types::CHAR, true_false());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let configuration = Arc::clone(&configuration);
            let reference = reference.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                reference.resolve(&configuration).expect("resolve")
            })
        })
        .collect();

    let resolved: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("resolver thread"))
        .collect();

    let canonical = &resolved[0];
    assert!(resolved
        .iter()
        .all(|basic| Arc::ptr_eq(basic, canonical)));
    assert_eq!(configuration.basic_type_registry().len(), 1);
}

#[test]
fn references_are_shared_across_threads_without_copies() {
    let reference = TypeReference::<String>::new("label", sql_types::VARCHAR);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let reference = reference.clone();
            thread::spawn(move || reference.as_immutable())
        })
        .collect();
    let derived: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("derivation thread"))
        .collect();

    for immutable in &derived {
        assert_eq!(immutable.name(), "imm_label");
        assert!(immutable.is_force_immutable());
    }
    assert!(!reference.is_force_immutable());
}
