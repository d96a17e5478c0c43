//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! The file uses one `<Action> = <KeySpec>` pair per line. Unknown lines are
//! skipped; anything not overridden keeps its default binding.
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::path::Path;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Show the key reference.
    OpenHelp,
    /// Next admin screen in the sidebar.
    NextScreen,
    /// Previous admin screen in the sidebar.
    PrevScreen,
    /// Type into the table search box.
    StartSearch,
    /// Open the create dialog for the current resource.
    NewRecord,
    /// Open the edit dialog for the selected row.
    EditRecord,
    /// Ask to delete the selected row.
    DeleteSelection,
    /// Open the row action menu / activate the selected item.
    EnterAction,
    /// Sort by the focused column; again to flip direction.
    SortColumn,
    /// Move sort focus one column right.
    NextColumn,
    /// Move sort focus one column left.
    PrevColumn,
    /// Step through the page size choices.
    CyclePageSize,
    /// Invalidate and refetch what the current screen shows.
    Refresh,
    /// Mark every notification as read.
    MarkAllRead,
    /// Switch between the color themes.
    ToggleTheme,
    /// Sign out and return to the login screen.
    Logout,
    /// Move up in the current list or form.
    MoveUp,
    /// Move down in the current list or form.
    MoveDown,
    /// Previous table page.
    MoveLeftPage,
    /// Next table page.
    MoveRightPage,
    /// Bound keys that should do nothing.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 22] = [
    KeyAction::Quit,
    KeyAction::OpenHelp,
    KeyAction::NextScreen,
    KeyAction::PrevScreen,
    KeyAction::StartSearch,
    KeyAction::NewRecord,
    KeyAction::EditRecord,
    KeyAction::DeleteSelection,
    KeyAction::EnterAction,
    KeyAction::SortColumn,
    KeyAction::NextColumn,
    KeyAction::PrevColumn,
    KeyAction::CyclePageSize,
    KeyAction::Refresh,
    KeyAction::MarkAllRead,
    KeyAction::ToggleTheme,
    KeyAction::Logout,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::MoveLeftPage,
    KeyAction::MoveRightPage,
    KeyAction::Ignore,
];

/// Maps `(KeyModifiers, KeyCode)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Built-in bindings used when no file overrides them.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Tab), KeyAction::NextScreen);
        // Shift+Tab is BackTab in crossterm; some terminals add SHIFT
        bindings.insert((M::NONE, BackTab), KeyAction::PrevScreen);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevScreen);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewRecord);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditRecord);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Enter), KeyAction::EnterAction);
        bindings.insert((M::NONE, Char('s')), KeyAction::SortColumn);
        bindings.insert((M::NONE, Char(']')), KeyAction::NextColumn);
        bindings.insert((M::NONE, Char('[')), KeyAction::PrevColumn);
        bindings.insert((M::NONE, Char('p')), KeyAction::CyclePageSize);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('m')), KeyAction::MarkAllRead);
        bindings.insert((M::NONE, Char('t')), KeyAction::ToggleTheme);
        bindings.insert((M::NONE, Char('L')), KeyAction::Logout);
        // Navigation
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::MoveLeftPage);
        bindings.insert((M::NONE, Right), KeyAction::MoveRightPage);
        bindings.insert((M::NONE, PageUp), KeyAction::MoveLeftPage);
        bindings.insert((M::NONE, PageDown), KeyAction::MoveRightPage);
        // Vim-like keys
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::MoveLeftPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::MoveRightPage);
        Self { bindings }
    }

    /// Load `path`, or write the defaults there on first run.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default keybindings");
        }
        km
    }

    /// Start from defaults and apply every recognised `Action = KeySpec` line.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Apply `Action = KeySpec` lines from `contents` over the defaults.
    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            match (parse_action(lhs), parse_key(rhs)) {
                (Some(action), Some(key)) => {
                    map.bindings.insert(key, action);
                }
                _ => tracing::debug!(line, "ignoring keybinding line"),
            }
        }
        map
    }

    /// Write every binding as `Action = KeySpec`, one per line.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# sacco-admin keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete, /\n\n");

        let mut entries: Vec<(String, &'static str)> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a != KeyAction::Ignore)
            .map(|((m, c), a)| (Self::format_key(*m, *c), format_action(*a)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        for (key, action) in entries {
            let _ = writeln!(&mut buf, "{action} = {key}");
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action. Shifted characters arrive with the
    /// SHIFT modifier on most terminals, so it is ignored for `Char` keys.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        let mut mods = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            mods.remove(KeyModifiers::SHIFT);
        }
        self.bindings.get(&(mods, key.code)).copied()
    }

    /// Keys bound to `action`, formatted for display.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| Self::format_key(*m, *c))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Every action with its keys, in a stable order for the help screen.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        ALL_ACTIONS
            .iter()
            .filter(|a| **a != KeyAction::Ignore)
            .map(|a| (format_action(*a), self.keys_for(*a).join(", ")))
            .filter(|(_, k)| !k.is_empty())
            .collect()
    }

    /// Format a key (modifiers + code) into a spec like "Ctrl+q" or "BackTab".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let name = s.trim();
    ALL_ACTIONS.iter().copied().find(|a| format_action(*a) == name)
}

/// Name of `a` as written in `keybinds.conf`.
pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::NextScreen => "NextScreen",
        KeyAction::PrevScreen => "PrevScreen",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::NewRecord => "NewRecord",
        KeyAction::EditRecord => "EditRecord",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::EnterAction => "EnterAction",
        KeyAction::SortColumn => "SortColumn",
        KeyAction::NextColumn => "NextColumn",
        KeyAction::PrevColumn => "PrevColumn",
        KeyAction::CyclePageSize => "CyclePageSize",
        KeyAction::Refresh => "Refresh",
        KeyAction::MarkAllRead => "MarkAllRead",
        KeyAction::ToggleTheme => "ToggleTheme",
        KeyAction::Logout => "Logout",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::MoveLeftPage => "MoveLeftPage",
        KeyAction::MoveRightPage => "MoveRightPage",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_resolve() {
        let km = Keymap::default();
        assert_eq!(km.resolve(&key(KeyCode::Char('j'), KeyModifiers::NONE)), Some(KeyAction::MoveDown));
        assert_eq!(km.resolve(&key(KeyCode::Tab, KeyModifiers::NONE)), Some(KeyAction::NextScreen));
        assert_eq!(km.resolve(&key(KeyCode::Char('L'), KeyModifiers::SHIFT)), Some(KeyAction::Logout));
        assert_eq!(km.resolve(&key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn file_overrides_defaults() {
        let km = Keymap::parse("# comment\nRefresh = Ctrl+r\nNotAnAction = x\nQuit = too-long\n");
        assert_eq!(km.resolve(&key(KeyCode::Char('r'), KeyModifiers::CONTROL)), Some(KeyAction::Refresh));
        assert_eq!(km.resolve(&key(KeyCode::Char('r'), KeyModifiers::NONE)), Some(KeyAction::Refresh));
        assert_eq!(km.resolve(&key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(KeyAction::Quit));
    }

    #[test]
    fn written_file_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.conf");
        let km = Keymap::load_or_init(&path);
        assert!(path.exists());
        let again = Keymap::from_file(&path).unwrap();
        assert_eq!(km.summary(), again.summary());
    }
}
