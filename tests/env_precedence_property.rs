use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use childrun::exec::env::PATH_SEPARATOR;
use childrun::exec::{RuntimeVars, resolve_environment};
use proptest::prelude::*;

const SLOTS: [&str; 5] = [
    "R_LIBS",
    "R_LIBS_USER",
    "R_LIBS_SITE",
    "R_PROFILE",
    "R_PROFILE_USER",
];

// Which harness-managed variables the caller pre-sets, and to what.
fn caller_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::vec(proptest::option::of("[a-z/]{0,12}"), SLOTS.len()).prop_map(
        |values| {
            SLOTS
                .iter()
                .zip(values)
                .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn test_resolver_respects_caller_and_fills_the_rest(
        caller in caller_strategy(),
        libpath in proptest::collection::vec("/[a-z]{1,8}", 0..4),
        use_system in any::<bool>(),
        use_user in any::<bool>(),
    ) {
        let profile = Path::new("/tmp/childrun-profile.R");
        let caller_os: BTreeMap<OsString, OsString> = caller
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();
        let env = resolve_environment(
            &caller_os,
            &libpath,
            profile,
            use_system,
            use_user,
            &RuntimeVars::default(),
        );

        // Caller-set values always survive.
        for (key, value) in &caller {
            prop_assert_eq!(env.get(key), Some(value.as_str()));
        }

        for var in ["R_LIBS", "R_LIBS_USER", "R_LIBS_SITE"] {
            if !caller.contains_key(var) {
                let value = env.get(var).unwrap();
                if libpath.is_empty() {
                    prop_assert!(!value.is_empty());
                } else {
                    prop_assert_eq!(value.to_string(), libpath.join(PATH_SEPARATOR));
                }
            }
        }

        if !caller.contains_key("R_PROFILE") {
            prop_assert_eq!(env.contains("R_PROFILE"), !use_system);
        }
        if !caller.contains_key("R_PROFILE_USER") {
            prop_assert_eq!(env.contains("R_PROFILE_USER"), !use_user);
        }
    }
}
