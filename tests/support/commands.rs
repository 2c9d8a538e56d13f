//! Command helper methods for Test.

use std::process::Output;

use assert_cmd::Command;

use super::{public_key_in, Test};

impl Test {
    /// A lockbox command running as `user`.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the user's own temporary home
    /// - `LOCKBOX_STORE` pointing at the shared store
    /// - colors off and no inherited lockbox or XDG settings
    pub fn cmd(&self, user: &str) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("lockbox").expect("failed to find lockbox binary");
        let home = self.home(user);
        std::fs::create_dir_all(&home).expect("failed to create home");

        cmd.env("HOME", &home);
        cmd.env("USERPROFILE", &home);
        cmd.env("LOCKBOX_STORE", self.store());
        cmd.env("NO_COLOR", "1");
        for var in [
            "LOCKBOX_CONFIG",
            "LOCKBOX_PASSPHRASE",
            "LOCKBOX_LOG",
            "XDG_CONFIG_HOME",
            "XDG_DATA_HOME",
        ] {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.root.path());
        cmd
    }

    /// Run `lockbox <args>` as `user`.
    pub fn run(&self, user: &str, args: &[&str]) -> Output {
        self.cmd(user)
            .args(args)
            .output()
            .expect("failed to run lockbox")
    }

    /// Run `lockbox <args>` as `user` with `input` on stdin.
    pub fn run_with_stdin(&self, user: &str, args: &[&str], input: &str) -> Output {
        self.cmd(user)
            .args(args)
            .write_stdin(input)
            .output()
            .expect("failed to run lockbox")
    }

    pub fn init_as(&self, user: &str, email: &str) -> Output {
        self.run(user, &["init", "--email", email, "--name", user])
    }

    /// Generate a key for `user`, record their email, return the public key.
    pub fn keygen(&self, user: &str, email: &str) -> String {
        let output = self.run(user, &["keygen", "--email", email]);
        super::assert_success(&output);
        public_key_in(&output)
    }

    /// Alice invites `email` with a trusted key.
    pub fn invite_trusted(&self, email: &str, key: &str, role: &str) -> Output {
        self.run(
            super::ALICE,
            &["team", "invite", email, "--key", key, "--trust", "--role", role],
        )
    }

    /// Give `user` a key and have Alice add them as a trusted member.
    pub fn join(&self, user: &str, email: &str, role: &str) -> String {
        let key = self.keygen(user, email);
        super::assert_success(&self.invite_trusted(email, &key, role));
        key
    }

    pub fn cred_add(&self, user: &str, website: &str, name: &str, password: &str) -> Output {
        self.run_with_stdin(
            user,
            &["cred", "add", website, name, "--username", "robot"],
            &format!("{}\n", password),
        )
    }

    pub fn cred_reveal(&self, user: &str, website: &str, name: &str) -> Output {
        self.run(user, &["cred", "show", website, name, "--reveal"])
    }

    pub fn env_set(&self, user: &str, project: &str, stage: &str, assignment: &str) -> Output {
        self.run(user, &["env", "set", project, stage, assignment])
    }
}
