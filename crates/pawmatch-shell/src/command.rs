//! REPL command parsing.

use pawmatch_core::search::SortOrder;

/// Every command the shell understands, as typed at the prompt.
pub const COMMANDS: &[&str] = &[
    "help", "login", "logout", "status", "breeds", "breed", "zip", "age", "sort", "size", "page",
    "next", "prev", "clear", "search", "refresh", "fav", "unfav", "match", "locations", "quit",
    "exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { name: String, email: String },
    Logout,
    Status,
    Breeds,
    /// Empty list clears the breed criterion
    Breed(Vec<String>),
    /// Empty input clears the ZIP criterion
    Zip(String),
    Age { min: u32, max: u32 },
    Sort(SortOrder),
    Size(u32),
    Page(u32),
    Next,
    Prev,
    Clear,
    Search,
    Refresh,
    Favorite(String),
    Unfavorite,
    Match,
    Locations(Vec<String>),
    Quit,
}

impl Command {
    /// Parses one input line; the error is a usage hint.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err("Empty command".to_string());
        };
        let args: Vec<&str> = parts.collect();

        match head {
            "help" | "?" => Ok(Command::Help),
            "login" => {
                let (email, name) = args
                    .split_last()
                    .filter(|(_, name)| !name.is_empty())
                    .ok_or("Usage: login <name> <email>")?;
                Ok(Command::Login {
                    name: name.join(" "),
                    email: email.to_string(),
                })
            }
            "logout" => Ok(Command::Logout),
            "status" => Ok(Command::Status),
            "breeds" => Ok(Command::Breeds),
            "breed" => Ok(Command::Breed(
                args.join(" ")
                    .split(',')
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            "zip" => Ok(Command::Zip(args.join(""))),
            "age" => match args.as_slice() {
                [min, max] => Ok(Command::Age {
                    min: parse_number(min, "age")?,
                    max: parse_number(max, "age")?,
                }),
                _ => Err("Usage: age <min> <max>".to_string()),
            },
            "sort" => match args.as_slice() {
                [order] => order
                    .parse::<SortOrder>()
                    .map(Command::Sort)
                    .map_err(|_| "Usage: sort <breed|name|age>:<asc|desc>".to_string()),
                _ => Err("Usage: sort <breed|name|age>:<asc|desc>".to_string()),
            },
            "size" => match args.as_slice() {
                [size] => Ok(Command::Size(parse_number(size, "size")?)),
                _ => Err("Usage: size <n>".to_string()),
            },
            "page" => match args.as_slice() {
                [page] => Ok(Command::Page(parse_number(page, "page")?)),
                _ => Err("Usage: page <n>".to_string()),
            },
            "next" => Ok(Command::Next),
            "prev" => Ok(Command::Prev),
            "clear" => Ok(Command::Clear),
            "search" | "s" => Ok(Command::Search),
            "refresh" => Ok(Command::Refresh),
            "fav" => match args.as_slice() {
                [id] => Ok(Command::Favorite(id.to_string())),
                _ => Err("Usage: fav <dog-id>".to_string()),
            },
            "unfav" => Ok(Command::Unfavorite),
            "match" => Ok(Command::Match),
            "locations" if !args.is_empty() => Ok(Command::Locations(
                args.iter().map(|z| z.to_string()).collect(),
            )),
            "locations" => Err("Usage: locations <zip> [zip...]".to_string()),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }
    }
}

fn parse_number(raw: &str, what: &str) -> Result<u32, String> {
    raw.parse()
        .map_err(|_| format!("'{}' is not a valid {}", raw, what))
}

pub const HELP: &str = "\
Session:
  login <name> <email>    Log in (name may contain spaces)
  logout                  Log out and clear saved state
  status                  Show session and search state
Search:
  breeds                  List available breeds
  breed <a, b, ...>       Filter by breeds (no argument clears)
  zip <12345>             Filter by ZIP code (no argument clears)
  age <min> <max>         Filter by age range
  sort <field>:<dir>      Sort by breed, name or age, asc or desc
  size <n>                Results per page
  page <n> | next | prev  Move between pages
  clear                   Reset filters, ZIP code and page
  search                  Show the current page
  refresh                 Refetch the current page
Favorites:
  fav <dog-id>            Toggle a favorite
  unfav                   Clear the favorite
  match                   Generate a match from your favorite
  locations <zip...>      Look up ZIP code locations
  quit                    Exit";
