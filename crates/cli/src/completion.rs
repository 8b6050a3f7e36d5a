//! Shell completion scripts.
//!
//! The static part (subcommands, flags) comes from `clap_complete`. Arguments
//! that name an identity are completed at run time from `gitid candidates`.

use std::io::{self, Write};

use clap::{Command, ValueEnum};
use clap_complete::{generate, Shell};

/// Subcommands whose first argument is an identity.
pub const IDENTITY_SUBCOMMANDS: &[&str] = &["switch", "use", "delete", "nickname", "edit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl CompletionShell {
    fn generator(self) -> Shell {
        match self {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
        }
    }
}

/// Write the completion script for `shell` to `out`.
pub fn write_script(
    shell: CompletionShell,
    cmd: &mut Command,
    bin: &str,
    out: &mut dyn Write,
) -> io::Result<()> {
    generate(shell.generator(), cmd, bin, out);
    writeln!(out)?;
    let subcommands = IDENTITY_SUBCOMMANDS.join(" ");
    match shell {
        CompletionShell::Bash => write!(
            out,
            r#"_{bin}_identities() {{
    if [[ ${{COMP_CWORD}} -eq 2 ]]; then
        case " {subcommands} " in
            *" ${{COMP_WORDS[1]}} "*)
                local IFS=$'\n'
                COMPREPLY=( $(compgen -W "$({bin} candidates 2>/dev/null)" -- "${{COMP_WORDS[COMP_CWORD]}}") )
                return 0
                ;;
        esac
    fi
    _{bin} "$@"
}}
complete -F _{bin}_identities -o bashdefault -o default {bin}
"#
        ),
        CompletionShell::Zsh => write!(
            out,
            r#"_{bin}_identities() {{
    if (( CURRENT == 3 )); then
        case " {subcommands} " in
            *" ${{words[2]}} "*)
                local -a candidates
                candidates=("${{(@f)$({bin} candidates 2>/dev/null)}}")
                compadd -a candidates
                return
                ;;
        esac
    fi
    _{bin} "$@"
}}
compdef _{bin}_identities {bin}
"#
        ),
        CompletionShell::Fish => writeln!(
            out,
            r#"complete -c {bin} -n "__fish_seen_subcommand_from {subcommands}" -f -a "({bin} candidates 2>/dev/null)""#
        ),
    }
}
