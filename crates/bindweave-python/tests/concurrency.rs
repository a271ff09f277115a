mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
};

use bindweave::{EnumBaseType, EnumSupportConfig};
use bindweave_python::EnumRegistry;
use pyo3::prelude::*;

use common::{color, descriptor, install_module, member_names, registry};

const THREADS: usize = 8;

#[test]
fn concurrent_materialization_builds_one_type() {
    let (registry, module) = Python::attach(|py| {
        // a slow factory releases the GIL mid-build so other threads find the cell busy
        let module = install_module(
            py,
            "enum_facility_slow",
            r#"
import enum
import time

calls = 0

def Enum(name, members, **kwargs):
    global calls
    calls += 1
    time.sleep(0.05)
    return enum.Enum(name, members, **kwargs)

IntEnum = enum.IntEnum
Flag = enum.Flag
IntFlag = enum.IntFlag
"#,
        );
        let config = EnumSupportConfig {
            enum_module: "enum_facility_slow".to_owned(),
            ..EnumSupportConfig::default()
        };
        (
            Arc::new(EnumRegistry::bootstrap(py, config).unwrap()),
            module.unbind(),
        )
    });
    let state = descriptor("State", EnumBaseType::Enum, &[("IDLE", 0), ("BUSY", 1)]);
    let barrier = Barrier::new(THREADS);

    let addresses: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    Python::attach(|py| registry.get_or_create(py, &state).unwrap().as_ptr() as usize)
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(registry.materialized_count(), 1);
    Python::attach(|py| {
        let calls: i64 = module.bind(py).getattr("calls").unwrap().extract().unwrap();
        assert_eq!(calls, 1);
        let built = state.type_object(py).unwrap();
        assert_eq!(member_names(built.as_any()), vec!["IDLE", "BUSY"]);
    });
}

#[test]
fn concurrent_conversions_share_the_type() {
    let registry = Python::attach(|py| Arc::new(registry(py)));
    let color = color();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for index in 0..THREADS {
            let registry = &registry;
            let color = &color;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let native = 1 << (index % 3);
                Python::attach(|py| {
                    let member = registry.to_host(py, native, color).unwrap();
                    assert_eq!(registry.to_native(&member, color).unwrap(), native);
                });
            });
        }
    });

    assert_eq!(registry.materialized_count(), 1);
}
