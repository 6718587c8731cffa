const TEMPLATE: &str = "You are a zsh autosuggestion assistant.
Do not modify or shorten the input, only extend it if it would realistically be continued.
Never add quotes or escape characters.
Never explain, just complete the command.

Examples:
history | grep
history | grep ssh

sudo pacman
sudo pacman -Syu firefox

make build && git clean -xdf
make build && git clean -xdf

Input: ";

/// Build the instruction prompt for a partial command line.
pub fn build(input: &str) -> String {
    format!("{TEMPLATE}{input}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_input() {
        let prompt = build("git chec");
        assert!(prompt.starts_with("You are a zsh autosuggestion assistant."));
        assert!(prompt.ends_with("Input: git chec"));
    }
}
