mod common;

use std::sync::Arc;

use bindweave::EnumBaseType;
use bindweave_python::EnumError;
use pretty_assertions::assert_eq;
use pyo3::{
    exceptions::{PyOverflowError, PyTypeError, PyValueError},
    prelude::*,
};

use common::{color, descriptor, install_module, member_names, registry};

#[test]
fn color_scenario() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();

        let red = registry.to_host(py, 1, &color).unwrap();
        let type_object = color.type_object(py).unwrap();
        assert!(red.is(&type_object.getattr("RED").unwrap()));
        assert_eq!(registry.to_native(&red, &color).unwrap(), 1);
        assert!(registry.is_flag_like(&red));

        let green = registry.to_host(py, 2, &color).unwrap();
        let combined = red.bitor(&green).unwrap();
        assert_eq!(registry.to_native(&combined, &color).unwrap(), 3);
        assert_eq!(registry.to_native(&red, &color).unwrap(), 1);
        assert_eq!(registry.to_native(&green, &color).unwrap(), 2);
    });
}

#[test]
fn to_host_materializes_on_demand() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        assert!(!color.is_materialized());
        registry.to_host(py, 4, &color).unwrap();
        assert!(color.is_materialized());
    });
}

#[test]
fn every_member_round_trips() {
    Python::attach(|py| {
        let registry = registry(py);
        let members = [("ZERO", 0), ("ONE", 1), ("TWO", 2), ("HIGH", 0x4000_0000), ("SIGN", i32::MIN)];
        for base_type in [
            EnumBaseType::Enum,
            EnumBaseType::IntEnum,
            EnumBaseType::UIntEnum,
            EnumBaseType::Flag,
            EnumBaseType::IntFlag,
        ] {
            let desc = descriptor("RoundTrip", base_type, &members);
            for (name, value) in members {
                let member = registry.to_host(py, value, &desc).unwrap();
                assert_eq!(
                    member.getattr("name").unwrap().extract::<String>().unwrap(),
                    name,
                    "{base_type}"
                );
                assert_eq!(registry.to_native(&member, &desc).unwrap(), value, "{base_type} {name}");
            }
        }
    });
}

#[test]
fn negative_unsigned_value_round_trips() {
    Python::attach(|py| {
        let registry = registry(py);
        let mask = descriptor("Mask", EnumBaseType::UIntEnum, &[("NONE", 0), ("ALL", -1)]);
        let all = registry.to_host(py, -1, &mask).unwrap();
        assert_eq!(all.getattr("value").unwrap().extract::<i64>().unwrap(), 0xffff_ffff);
        assert_eq!(registry.to_native(&all, &mask).unwrap(), -1);
    });
}

#[test]
fn unknown_value_of_plain_enum_is_a_host_error() {
    Python::attach(|py| {
        let registry = registry(py);
        let mode = descriptor("Mode", EnumBaseType::Enum, &[("OFF", 0), ("ON", 1)]);
        let err = registry.to_host(py, 7, &mode).unwrap_err();
        match err {
            EnumError::Host(source) => assert!(source.is_instance_of::<PyValueError>(py)),
            other => panic!("unexpected error: {other}"),
        }
    });
}

#[test]
fn wrong_type_is_a_mismatch() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        let mode = descriptor("Mode", EnumBaseType::Enum, &[("OFF", 0), ("ON", 1)]);
        let off = registry.to_host(py, 0, &mode).unwrap();

        let err = registry.to_native(&off, &color).unwrap_err();
        match &err {
            EnumError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "Color");
                assert_eq!(found, "Mode");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "a member of enum 'Color' is expected not 'Mode'");
        assert!(PyErr::from(err).is_instance_of::<PyTypeError>(py));

        // plain integers are never coerced, even for int flags
        let one = 1_i32.into_pyobject(py).unwrap();
        let err = registry.to_native(one.as_any(), &color).unwrap_err();
        assert!(matches!(err, EnumError::TypeMismatch { ref found, .. } if found == "int"), "{err}");
    });
}

#[test]
fn mismatch_materializes_expected_type() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        let text = "RED".into_pyobject(py).unwrap();
        assert!(registry.to_native(text.as_any(), &color).is_err());
        assert!(color.is_materialized());
    });
}

#[test]
fn out_of_range_pseudo_member_is_rejected() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        let type_object = registry.get_or_create(py, &color).unwrap();
        // int flags keep unknown bits, so this is a valid host member
        let wide = type_object.call1((1_i64 << 40,)).unwrap();
        let err = registry.to_native(&wide, &color).unwrap_err();
        assert!(matches!(err, EnumError::ValueRange(_)), "{err}");
    });
}

#[test]
fn pseudo_member_wider_than_i64_is_out_of_range() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        let type_object = registry.get_or_create(py, &color).unwrap();
        let huge = type_object.call1((1_i128 << 70,)).unwrap();
        let err = registry.to_native(&huge, &color).unwrap_err();
        match &err {
            EnumError::ValueRange(range) => {
                assert_eq!(range.value, (1_i128 << 70).to_string());
                assert_eq!(range.base_type, EnumBaseType::IntFlag);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(PyErr::from(err).is_instance_of::<PyOverflowError>(py));
    });
}

#[test]
fn flag_like_only_for_flag_families() {
    Python::attach(|py| {
        let registry = registry(py);
        for (base_type, flag_like) in [
            (EnumBaseType::Enum, false),
            (EnumBaseType::IntEnum, false),
            (EnumBaseType::UIntEnum, false),
            (EnumBaseType::Flag, true),
            (EnumBaseType::IntFlag, true),
        ] {
            let desc = descriptor("Kind", base_type, &[("A", 1), ("B", 2)]);
            let member = registry.to_host(py, 1, &desc).unwrap();
            assert_eq!(registry.is_flag_like(&member), flag_like, "{base_type}");
            assert_eq!(
                registry.is_flag_like(desc.type_object(py).unwrap().as_any()),
                flag_like,
                "{base_type} type"
            );
            assert!(registry.is_enum_like(&member), "{base_type}");
        }
    });
}

#[test]
fn non_enums_are_neither_flag_nor_enum_like() {
    Python::attach(|py| {
        let registry = registry(py);
        let one = 1_i32.into_pyobject(py).unwrap();
        assert!(!registry.is_flag_like(one.as_any()));
        assert!(!registry.is_enum_like(one.as_any()));
        let int_type = one.get_type();
        assert!(!registry.is_enum_like(int_type.as_any()));
    });
}

#[test]
fn descriptor_is_recovered_from_members_and_types() {
    Python::attach(|py| {
        let registry = registry(py);
        let color = color();
        let red = registry.to_host(py, 1, &color).unwrap();
        let recovered = registry.recover_descriptor(&red).unwrap();
        assert!(Arc::ptr_eq(&recovered, &color));

        let type_object = color.type_object(py).unwrap();
        let recovered = registry.recover_descriptor(type_object.as_any()).unwrap();
        assert!(Arc::ptr_eq(&recovered, &color));

        let blue = registry.to_host(py, 4, &color).unwrap();
        let combined = red.bitor(&blue).unwrap();
        assert!(Arc::ptr_eq(&registry.recover_descriptor(&combined).unwrap(), &color));
    });
}

#[test]
fn recovery_of_foreign_objects_is_none() {
    Python::attach(|py| {
        let registry = registry(py);
        let module = install_module(
            py,
            "foreign_enums",
            "import enum\nclass Shade(enum.Enum):\n    DARK = 1\n",
        );
        let dark = module.getattr("Shade").unwrap().getattr("DARK").unwrap();
        assert!(registry.is_enum_like(&dark));
        assert!(registry.recover_descriptor(&dark).is_none());

        let text = "DARK".into_pyobject(py).unwrap();
        assert!(registry.recover_descriptor(text.as_any()).is_none());
    });
}

#[test]
fn recovery_is_scoped_to_the_registry() {
    Python::attach(|py| {
        let first = registry(py);
        let second = registry(py);
        let color = color();
        let red = first.to_host(py, 1, &color).unwrap();
        assert!(first.recover_descriptor(&red).is_some());
        assert!(second.recover_descriptor(&red).is_none());
    });
}

#[test]
fn recovery_works_through_any_registry_that_converts() {
    Python::attach(|py| {
        let first = registry(py);
        let second = registry(py);
        let color = color();
        let built = first.get_or_create(py, &color).unwrap();
        assert_eq!(member_names(built.as_any()), vec!["RED", "GREEN", "BLUE"]);

        let red = second.to_host(py, 1, &color).unwrap();
        let recovered = second.recover_descriptor(&red).unwrap();
        assert!(Arc::ptr_eq(&recovered, &color));
        assert_eq!(second.to_native(&red, &color).unwrap(), 1);
        assert_eq!(second.materialized_count(), 1);
        assert_eq!(built.as_ptr(), color.type_object(py).unwrap().as_ptr());
    });
}
