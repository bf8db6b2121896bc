//! User-facing text in every supported language. The controller only ever
//! produces [`Message`] values; turning them into strings happens at the view
//! edge so tests can assert on intent instead of wording.

use serde::Deserialize;

/// Interface language. Also decides the action tags written to the audit log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pl")]
    Polish,
}

/// Action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Lend,
    Return,
}

/// Everything the controller can tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    ToolAdded(String),
    BorrowerAdded(String),
    ToolDeleted(String),
    BorrowerDeleted(String),
    Lent { tool: String, borrower: String },
    Returned { tool: String, borrower: String },
    BlankName,
    NameTooLong { max: usize },
    ToolExists(String),
    BorrowerExists(String),
    SelectToolToDelete,
    SelectBorrowerToDelete,
    ToolInUse(String),
    BorrowerInUse(String),
    LendFieldsMissing,
    InvalidTool(String),
    InvalidBorrower(String),
    AlreadyLent(String),
    LoanMissing(String),
    SaveFailed(String),
    AuditFailed(String),
    ConfirmDeleteTool(String),
    ConfirmDeleteBorrower(String),
    ConfirmReturn { tool: String, borrower: String },
}

/// Static captions used by the terminal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    AppTitle,
    Tools,
    Borrowers,
    LendPanel,
    Borrowed,
    ToolField,
    BorrowerField,
    NewName,
    NoLoans,
    Return,
    Info,
    Warning,
    Error,
    Confirm,
    ConfirmHint,
    DismissHint,
    MainHint,
}

impl Locale {
    pub fn audit_tag(self, action: AuditAction) -> &'static str {
        match (self, action) {
            (Locale::English, AuditAction::Lend) => "LEND",
            (Locale::English, AuditAction::Return) => "RETURN",
            (Locale::Polish, AuditAction::Lend) => "WYPOŻYCZ",
            (Locale::Polish, AuditAction::Return) => "ZWROT",
        }
    }

    pub fn label(self, label: Label) -> &'static str {
        match self {
            Locale::English => match label {
                Label::AppTitle => "TOOL LENDING TRACKER",
                Label::Tools => " TOOLS ",
                Label::Borrowers => " BORROWERS ",
                Label::LendPanel => " LEND A TOOL ",
                Label::Borrowed => " CURRENTLY BORROWED ",
                Label::ToolField => "Tool:",
                Label::BorrowerField => "Borrower:",
                Label::NewName => "New:",
                Label::NoLoans => "No items currently borrowed",
                Label::Return => "↩ Return",
                Label::Info => "Info",
                Label::Warning => "Warning",
                Label::Error => "Error",
                Label::Confirm => "Confirm",
                Label::ConfirmHint => "Press Y to confirm or N / Esc to cancel.",
                Label::DismissHint => "Press Enter or Esc to continue.",
                Label::MainHint => {
                    "[Tab] Next panel  [Enter] Add/Lend/Return  [Del] Delete  [Ctrl+L] Lend  [Ctrl+Q] Quit"
                }
            },
            Locale::Polish => match label {
                Label::AppTitle => "SYSTEM WYPOŻYCZANIA NARZĘDZI",
                Label::Tools => " NARZĘDZIA ",
                Label::Borrowers => " POŻYCZAJĄCY ",
                Label::LendPanel => " WYPOŻYCZ NARZĘDZIE ",
                Label::Borrowed => " AKTUALNIE WYPOŻYCZONE ",
                Label::ToolField => "Narzędzie:",
                Label::BorrowerField => "Pożyczający:",
                Label::NewName => "Nowy:",
                Label::NoLoans => "Brak aktualnie wypożyczonych przedmiotów",
                Label::Return => "↩ Zwróć",
                Label::Info => "Informacja",
                Label::Warning => "Ostrzeżenie",
                Label::Error => "Błąd",
                Label::Confirm => "Potwierdź",
                Label::ConfirmHint => "Naciśnij Y, aby potwierdzić, lub N / Esc, aby anulować.",
                Label::DismissHint => "Naciśnij Enter lub Esc, aby kontynuować.",
                Label::MainHint => {
                    "[Tab] Następny panel  [Enter] Dodaj/Wypożycz/Zwróć  [Del] Usuń  [Ctrl+L] Wypożycz  [Ctrl+Q] Wyjście"
                }
            },
        }
    }

    pub fn render(self, message: &Message) -> String {
        match self {
            Locale::English => render_english(message),
            Locale::Polish => render_polish(message),
        }
    }
}

fn render_english(message: &Message) -> String {
    match message {
        Message::ToolAdded(name) => format!("Added tool '{name}'."),
        Message::BorrowerAdded(name) => format!("Added borrower '{name}'."),
        Message::ToolDeleted(name) => format!("Deleted tool '{name}'."),
        Message::BorrowerDeleted(name) => format!("Deleted borrower '{name}'."),
        Message::Lent { tool, borrower } => format!("Lent '{tool}' to {borrower}."),
        Message::Returned { tool, borrower } => format!("'{tool}' returned by {borrower}."),
        Message::BlankName => "Enter a name first.".to_string(),
        Message::NameTooLong { max } => format!("Names are limited to {max} characters."),
        Message::ToolExists(name) => format!("Tool '{name}' already exists!"),
        Message::BorrowerExists(name) => format!("Borrower '{name}' already exists!"),
        Message::SelectToolToDelete => "Select a tool to delete.".to_string(),
        Message::SelectBorrowerToDelete => "Select a borrower to delete.".to_string(),
        Message::ToolInUse(name) => {
            format!("Cannot delete '{name}' - it is currently borrowed!")
        }
        Message::BorrowerInUse(name) => format!("Cannot delete '{name}' - has active loans!"),
        Message::LendFieldsMissing => "Select/Enter both a tool and a borrower!".to_string(),
        Message::InvalidTool(name) => {
            format!("Invalid tool: '{name}'. Please add it first or select from the list.")
        }
        Message::InvalidBorrower(name) => format!(
            "Invalid borrower: '{name}'. Please add them first or select from the list."
        ),
        Message::AlreadyLent(name) => format!("Tool '{name}' is already borrowed!"),
        Message::LoanMissing(tool) => format!("'{tool}' is no longer on loan."),
        Message::SaveFailed(cause) => format!("Could not save data: {cause}"),
        Message::AuditFailed(cause) => format!("Saved, but the history log failed: {cause}"),
        Message::ConfirmDeleteTool(name) => format!("Delete tool '{name}'?"),
        Message::ConfirmDeleteBorrower(name) => format!("Delete borrower '{name}'?"),
        Message::ConfirmReturn { tool, borrower } => format!("Return '{tool}' from {borrower}?"),
    }
}

fn render_polish(message: &Message) -> String {
    match message {
        Message::ToolAdded(name) => format!("Dodano narzędzie '{name}'."),
        Message::BorrowerAdded(name) => format!("Dodano pożyczającego '{name}'."),
        Message::ToolDeleted(name) => format!("Usunięto narzędzie '{name}'."),
        Message::BorrowerDeleted(name) => format!("Usunięto pożyczającego '{name}'."),
        Message::Lent { tool, borrower } => format!("Wypożyczono '{tool}' dla {borrower}."),
        Message::Returned { tool, borrower } => format!("{borrower} zwrócił(a) '{tool}'."),
        Message::BlankName => "Najpierw wpisz nazwę.".to_string(),
        Message::NameTooLong { max } => format!("Nazwa może mieć najwyżej {max} znaków."),
        Message::ToolExists(name) => format!("Narzędzie '{name}' już istnieje!"),
        Message::BorrowerExists(name) => format!("Pożyczający '{name}' już istnieje!"),
        Message::SelectToolToDelete => "Wybierz narzędzie do usunięcia.".to_string(),
        Message::SelectBorrowerToDelete => "Wybierz pożyczającego do usunięcia.".to_string(),
        Message::ToolInUse(name) => {
            format!("Nie można usunąć '{name}' - jest aktualnie wypożyczone!")
        }
        Message::BorrowerInUse(name) => {
            format!("Nie można usunąć '{name}' - ma aktywne wypożyczenia!")
        }
        Message::LendFieldsMissing => {
            "Wybierz/Wpisz zarówno narzędzie jak i pożyczającego!".to_string()
        }
        Message::InvalidTool(name) => format!(
            "Nieprawidłowe narzędzie: '{name}'. Proszę najpierw je dodać lub wybrać z listy."
        ),
        Message::InvalidBorrower(name) => format!(
            "Nieprawidłowy pożyczający: '{name}'. Proszę najpierw go dodać lub wybrać z listy."
        ),
        Message::AlreadyLent(name) => format!("Narzędzie '{name}' jest już wypożyczone!"),
        Message::LoanMissing(tool) => format!("'{tool}' nie jest już wypożyczone."),
        Message::SaveFailed(cause) => format!("Nie udało się zapisać danych: {cause}"),
        Message::AuditFailed(cause) => {
            format!("Zapisano, ale nie udało się uzupełnić historii: {cause}")
        }
        Message::ConfirmDeleteTool(name) => format!("Usunąć narzędzie '{name}'?"),
        Message::ConfirmDeleteBorrower(name) => format!("Usunąć pożyczającego '{name}'?"),
        Message::ConfirmReturn { tool, borrower } => {
            format!("Zwrócić '{tool}' od {borrower}?")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_tags_follow_locale() {
        assert_eq!(Locale::English.audit_tag(AuditAction::Lend), "LEND");
        assert_eq!(Locale::English.audit_tag(AuditAction::Return), "RETURN");
        assert_eq!(Locale::Polish.audit_tag(AuditAction::Lend), "WYPOŻYCZ");
        assert_eq!(Locale::Polish.audit_tag(AuditAction::Return), "ZWROT");
    }

    #[test]
    fn renders_conflict_messages() {
        let message = Message::ToolInUse("Hammer".into());
        assert_eq!(
            Locale::English.render(&message),
            "Cannot delete 'Hammer' - it is currently borrowed!"
        );
        assert_eq!(
            Locale::Polish.render(&message),
            "Nie można usunąć 'Hammer' - jest aktualnie wypożyczone!"
        );
    }
}
