//! Property-based tests for the argument chain.
//!
//! These tests use proptest to verify ordering and token-partition
//! invariants across randomly generated inputs.

use proptest::prelude::*;

use hubcap::engine::{render_command, render_commands, ArgumentList, Step, StepSpec};
use hubcap::forge::{GitUrlOptions, Project};
use hubcap::core::settings::HostSettings;

/// Strategy for plain word tokens.
fn word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}"
}

/// Strategy for tokens that may be flags.
fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        word(),
        word().prop_map(|w| format!("-{}", w)),
        word().prop_map(|w| format!("--{}", w)),
        (word(), word()).prop_map(|(k, v)| format!("--{}={}", k, v)),
    ]
}

#[derive(Debug, Clone)]
enum Insert {
    Before(String),
    After(String),
}

fn insert() -> impl Strategy<Value = Insert> {
    prop_oneof![
        word().prop_map(Insert::Before),
        word().prop_map(Insert::After),
    ]
}

fn list(tokens: &[String]) -> ArgumentList {
    ArgumentList::with_executable(tokens.iter().cloned(), vec!["git".to_string()])
}

proptest! {
    /// An untouched chain is exactly one command: the executable plus tokens.
    #[test]
    fn plain_chain_is_one_command(tokens in prop::collection::vec(token(), 0..8)) {
        let args = list(&tokens);
        let commands = args.commands();
        prop_assert_eq!(commands.len(), 1);

        let mut expected = vec!["git".to_string()];
        expected.extend(tokens.iter().cloned());
        prop_assert_eq!(commands[0].argv(), Some(expected.as_slice()));
    }

    /// Befores keep insertion order ahead of the original, afters keep
    /// insertion order behind it.
    #[test]
    fn chain_order(ops in prop::collection::vec(insert(), 0..10)) {
        let mut args = list(&["status".to_string()]);
        let mut befores = Vec::new();
        let mut afters = Vec::new();

        for op in &ops {
            match op {
                Insert::Before(name) => {
                    args.before(StepSpec::command(name.clone())).unwrap();
                    befores.push(name.clone());
                }
                Insert::After(name) => {
                    args.after(StepSpec::command(name.clone())).unwrap();
                    afters.push(name.clone());
                }
            }
        }

        let mut expected = befores;
        expected.push("git status".to_string());
        expected.extend(afters);
        prop_assert_eq!(render_commands(&args), expected);

        let markers = args.steps().iter().filter(|s| matches!(s, Step::Original)).count();
        prop_assert_eq!(markers, 1);
    }

    /// Every token is a word or a flag, never both.
    #[test]
    fn words_and_flags_partition(tokens in prop::collection::vec(token(), 0..12)) {
        let args = list(&tokens);
        let words = args.words();
        let flags = args.flags();

        prop_assert_eq!(words.len() + flags.len(), tokens.len());
        for t in &tokens {
            prop_assert!(words.contains(&t.as_str()) != flags.contains(&t.as_str()));
        }
        for flag in &flags {
            prop_assert!(flag.starts_with('-'));
            prop_assert!(args.has_flag(&[flag.split('=').next().unwrap()]));
        }
    }

    /// Skipping always yields an empty command string.
    #[test]
    fn skip_renders_nothing(
        tokens in prop::collection::vec(token(), 0..6),
        ops in prop::collection::vec(insert(), 0..4),
    ) {
        let mut args = list(&tokens);
        for op in ops {
            match op {
                Insert::Before(name) => args.before(StepSpec::command(name)).unwrap(),
                Insert::After(name) => args.after(StepSpec::command(name)).unwrap(),
            }
        }
        args.skip();
        prop_assert_eq!(render_command(&args), "");
    }

    /// Clone URL schemes follow the options.
    #[test]
    fn git_url_schemes(owner in word(), name in word(), private in any::<bool>()) {
        let hosts = HostSettings::default();
        let project = Project::new(owner, name, None, &hosts);

        let https = project.git_url(GitUrlOptions { https: true, private });
        prop_assert!(https.starts_with("https://"));

        let ssh = project.git_url(GitUrlOptions { https: false, private: true });
        prop_assert!(ssh.starts_with("git@"));

        let anonymous = project.git_url(GitUrlOptions::default());
        prop_assert!(anonymous.starts_with("git://"));
        prop_assert!(anonymous.ends_with(".git"));
    }
}
