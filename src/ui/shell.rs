use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::analysis::{CompanyReport, Ratio, TopReport};
use crate::database::CompanyRepository;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Company, FieldUpdate, Financial, FinancialField, FinancialUpdate};
use crate::ui::menu::{Command, Menu};

/// Whether the session keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Text-menu front end over a record store.
///
/// Reads answers from any `BufRead` and writes prompts and results to any
/// `Write`, so a whole session can be scripted in tests. End of input ends
/// the session quietly.
pub struct Shell<'a, S, R, W>
where
    S: CompanyRepository + ?Sized,
{
    store: &'a mut S,
    input: R,
    output: W,
    top_limit: usize,
}

impl<'a, S, R, W> Shell<'a, S, R, W>
where
    S: CompanyRepository + ?Sized,
    R: BufRead,
    W: Write,
{
    pub fn new(store: &'a mut S, input: R, output: W, top_limit: usize) -> Self {
        Self {
            store,
            input,
            output,
            top_limit,
        }
    }

    /// Run the main menu until the user exits or input runs out.
    pub fn run(&mut self) -> LedgerResult<()> {
        loop {
            let Some(answer) = self.prompt(&Menu::Main.render())? else {
                return Ok(());
            };
            let flow = match Menu::Main.parse(&answer) {
                Command::Exit => {
                    self.say("Have a nice day!")?;
                    Flow::Quit
                }
                Command::OpenCrud => self.submenu(Menu::Crud)?,
                Command::OpenTopTen => self.submenu(Menu::TopTen)?,
                _ => self.invalid()?,
            };
            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Show a sub-menu, perform one action, then hand control back to the main menu.
    fn submenu(&mut self, menu: Menu) -> LedgerResult<Flow> {
        let Some(answer) = self.prompt(&menu.render())? else {
            return Ok(Flow::Quit);
        };
        let command = menu.parse(&answer);
        debug!("{:?} -> {:?}", menu, command);
        self.dispatch(command)
    }

    fn dispatch(&mut self, command: Command) -> LedgerResult<Flow> {
        let result = match command {
            Command::Back => Ok(Flow::Continue),
            Command::Create => self.create_company(),
            Command::Read => self.read_company(),
            Command::Update => self.update_company(),
            Command::Delete => self.delete_company(),
            Command::List => self.list_companies(),
            Command::Top(ratio) => self.top_ten(ratio),
            Command::Exit | Command::OpenCrud | Command::OpenTopTen | Command::Invalid => {
                self.invalid()
            }
        };

        match result {
            Err(e) if e.is_user_error() => {
                warn!("Rejected input: {}", e);
                self.say(&format!("Error: {}", e))?;
                Ok(Flow::Continue)
            }
            other => other,
        }
    }

    fn create_company(&mut self) -> LedgerResult<Flow> {
        let Some(ticker) = self.prompt("Enter ticker (in the format 'MOON'):")? else {
            return Ok(Flow::Quit);
        };
        let Some(name) = self.prompt("Enter company (in the format 'Moon Corp'):")? else {
            return Ok(Flow::Quit);
        };
        let Some(sector) = self.prompt("Enter industries (in the format 'Technology'):")? else {
            return Ok(Flow::Quit);
        };

        let company = Company::new(ticker, name, Some(sector)).validated()?;
        if self.store.get_company(&company.ticker)?.is_some() {
            return Err(LedgerError::duplicate(&company.ticker));
        }

        let mut financial = Financial::empty(company.ticker.clone());
        for field in FinancialField::ALL {
            let Some(value) = self.prompt_number(field)? else {
                return Ok(Flow::Quit);
            };
            financial.set(field, value);
        }

        self.store.create(company, Some(financial))?;
        self.say("Company created successfully!")?;
        Ok(Flow::Continue)
    }

    fn read_company(&mut self) -> LedgerResult<Flow> {
        let company = match self.find_company()? {
            Some(Selection::Picked(company)) => company,
            Some(Selection::Nothing) => return Ok(Flow::Continue),
            None => return Ok(Flow::Quit),
        };

        match self.store.get_company(&company.ticker)? {
            Some(record) => self.say(&CompanyReport::from(record).to_string())?,
            None => self.say("Company not found!")?,
        }
        Ok(Flow::Continue)
    }

    fn update_company(&mut self) -> LedgerResult<Flow> {
        let company = match self.find_company()? {
            Some(Selection::Picked(company)) => company,
            Some(Selection::Nothing) => return Ok(Flow::Continue),
            None => return Ok(Flow::Quit),
        };

        let mut update = FinancialUpdate::new();
        for field in FinancialField::ALL {
            let Some(value) = self.prompt_number(field)? else {
                return Ok(Flow::Quit);
            };
            let change = match value {
                Some(v) => FieldUpdate::Set(v),
                None => FieldUpdate::Clear,
            };
            update = update.with(field, change);
        }

        self.store.update_financial(&company.ticker, update)?;
        self.say("Company updated successfully!")?;
        Ok(Flow::Continue)
    }

    fn delete_company(&mut self) -> LedgerResult<Flow> {
        let company = match self.find_company()? {
            Some(Selection::Picked(company)) => company,
            Some(Selection::Nothing) => return Ok(Flow::Continue),
            None => return Ok(Flow::Quit),
        };

        self.store.delete(&company.ticker)?;
        self.say("Company deleted successfully!")?;
        Ok(Flow::Continue)
    }

    fn list_companies(&mut self) -> LedgerResult<Flow> {
        let companies = self.store.list_all()?;
        self.say("COMPANY LIST")?;
        for company in companies {
            self.say(&company_line(&company))?;
        }
        Ok(Flow::Continue)
    }

    fn top_ten(&mut self, ratio: Ratio) -> LedgerResult<Flow> {
        let report = TopReport::build(&*self.store, ratio, self.top_limit)?;
        self.say(&report.to_string())?;
        Ok(Flow::Continue)
    }

    /// Search by name and let the user pick one of the matches by index.
    ///
    /// `None` means input ran out.
    fn find_company(&mut self) -> LedgerResult<Option<Selection>> {
        let Some(name) = self.prompt("Enter company name:")? else {
            return Ok(None);
        };
        let companies = self.store.find_by_name_substring(&name)?;
        if companies.is_empty() {
            self.say("Company not found!")?;
            return Ok(Some(Selection::Nothing));
        }

        for (i, company) in companies.iter().enumerate() {
            self.say(&format!("{} {}", i, company.name))?;
        }
        let Some(answer) = self.prompt("Enter company number:")? else {
            return Ok(None);
        };

        match answer.trim().parse::<usize>().ok().and_then(|i| companies.get(i)) {
            Some(company) => Ok(Some(Selection::Picked(company.clone()))),
            None => {
                self.invalid()?;
                Ok(Some(Selection::Nothing))
            }
        }
    }

    /// Ask for one figure until the answer is blank or a valid number.
    fn prompt_number(&mut self, field: FinancialField) -> LedgerResult<Option<Option<f64>>> {
        let question = format!("Enter {} (in the format '987654321'):", field.label());
        loop {
            let Some(answer) = self.prompt(&question)? else {
                return Ok(None);
            };
            match field.parse_value(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    debug!("Re-prompting {}: {}", field, e);
                    self.say("Invalid number, try again.")?;
                }
            }
        }
    }

    fn invalid(&mut self) -> LedgerResult<Flow> {
        self.say("Invalid option!")?;
        Ok(Flow::Continue)
    }

    fn say(&mut self, text: &str) -> LedgerResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Print a question and read one line; `None` at end of input.
    fn prompt(&mut self, question: &str) -> LedgerResult<Option<String>> {
        self.say(question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

enum Selection {
    Picked(Company),
    Nothing,
}

/// `TICKER name sector` as the company list prints it.
pub fn company_line(company: &Company) -> String {
    format!(
        "{} {} {}",
        company.ticker,
        company.name,
        company.sector.as_deref().unwrap_or("None")
    )
}
