use crate::analysis::Ratio;

/// Which menu the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    Crud,
    TopTen,
}

/// What a menu answer asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Back,
    OpenCrud,
    OpenTopTen,
    Create,
    Read,
    Update,
    Delete,
    List,
    Top(Ratio),
    Invalid,
}

impl Menu {
    pub fn title(self) -> &'static str {
        match self {
            Menu::Main => "MAIN MENU",
            Menu::Crud => "CRUD MENU",
            Menu::TopTen => "TOP TEN MENU",
        }
    }

    pub fn options(self) -> &'static [&'static str] {
        match self {
            Menu::Main => &[
                "0 Exit",
                "1 CRUD operations",
                "2 Show top ten companies by criteria",
            ],
            Menu::Crud => &[
                "0 Back",
                "1 Create a company",
                "2 Read a company",
                "3 Update a company",
                "4 Delete a company",
                "5 List all companies",
            ],
            Menu::TopTen => &[
                "0 Back",
                "1 List by ND/EBITDA",
                "2 List by ROE",
                "3 List by ROA",
            ],
        }
    }

    /// Full text printed before asking for an option.
    pub fn render(self) -> String {
        let mut lines = vec![self.title()];
        lines.extend_from_slice(self.options());
        lines.push("Enter an option:");
        lines.join("\n")
    }

    pub fn parse(self, answer: &str) -> Command {
        match (self, answer.trim()) {
            (Menu::Main, "0") => Command::Exit,
            (Menu::Main, "1") => Command::OpenCrud,
            (Menu::Main, "2") => Command::OpenTopTen,
            (Menu::Crud, "0") | (Menu::TopTen, "0") => Command::Back,
            (Menu::Crud, "1") => Command::Create,
            (Menu::Crud, "2") => Command::Read,
            (Menu::Crud, "3") => Command::Update,
            (Menu::Crud, "4") => Command::Delete,
            (Menu::Crud, "5") => Command::List,
            (Menu::TopTen, "1") => Command::Top(Ratio::NetDebtToEbitda),
            (Menu::TopTen, "2") => Command::Top(Ratio::ReturnOnEquity),
            (Menu::TopTen, "3") => Command::Top(Ratio::ReturnOnAssets),
            _ => Command::Invalid,
        }
    }
}
