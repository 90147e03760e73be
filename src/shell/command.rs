/*!
 * Shell Commands
 * Text command parsing for the interactive interface
 */

/// One parsed shell command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Alloc(usize),
    Free(usize),
    Stats { json: bool },
    Layout,
    Validate,
    Test,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` means the line was blank.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };

        let command = match keyword {
            "alloc" => {
                let arg = words.next().ok_or("usage: alloc <size>")?;
                let size: usize = arg
                    .parse()
                    .map_err(|_| format!("invalid size: {}", arg))?;
                if size == 0 {
                    return Err("invalid size: 0".to_string());
                }
                Self::Alloc(size)
            }
            "free" => {
                let arg = words.next().ok_or("usage: free <address>")?;
                let digits = arg.trim_start_matches("0x");
                let address = usize::from_str_radix(digits, 16)
                    .map_err(|_| format!("invalid address: {}", arg))?;
                Self::Free(address)
            }
            "stats" => Self::Stats {
                json: words.next() == Some("json"),
            },
            "layout" => Self::Layout,
            "validate" => Self::Validate,
            "test" => Self::Test,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };

        Ok(Some(command))
    }
}
