use std::ffi::OsString;

use clap::{App, Arg, ArgMatches};

use crate::executable_name;

pub fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("git-rebase-chain")
        .bin_name(executable_name())
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rebase a chain of dependent branches onto an amended commit, in sequence.")
        .arg(
            Arg::with_name("target")
                .help("The amended commit the chain should now be based on.")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("head")
                .short("@")
                .long("head")
                .value_name("head")
                .help("The top of the chain [default: the checked-out branch]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dry")
                .short("d")
                .long("dry")
                .help("Print the plan without changing any refs, local or remote.")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("push")
                .short("p")
                .long("push")
                .value_name("remote")
                .help("Force-push every updated branch to <remote> as well.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("force")
                .short("f")
                .long("force")
                .help("Don't ask for confirmation. With --push, also create branches missing on the remote.")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Print more (-v plan, -vv git commands, -vvv git output)")
                .multiple(true)
                .takes_value(false),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Print less")
                .conflicts_with("verbose")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("chain")
                .short("c")
                .long("chain")
                .value_name("branch")
                .help("Relocate exactly these comma-separated branches, nearest to the target first.")
                .multiple(true)
                .require_delimiter(true)
                .conflicts_with("tracking")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("tracking")
                .short("t")
                .long("tracking")
                .help("Discover the chain by following each branch's upstream.")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("base")
                .short("b")
                .long("base")
                .value_name("commit")
                .help("The commit the target was amended from, when it can't be found by its message.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print the relocation report as JSON.")
                .takes_value(false),
        )
}

pub fn parse_arg_matches<'a, I, T>(arguments: I) -> Result<ArgMatches<'a>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    build_app().get_matches_from_safe(arguments)
}
