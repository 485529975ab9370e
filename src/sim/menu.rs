/// Pre-game menu: a title over a vertical list of options.
///
/// Each `Menu` owns its labels and its layout. The layout is computed once in
/// `new()` in terminal cells relative to the menu's own top-left corner; the
/// renderer only centers the block on screen and paints it.

pub const TITLE: &str = "Incognito";

/// Horizontal padding around a label inside its selection bar.
const PAD: u16 = 2;
/// Rows between the title and the first option.
const TITLE_GAP: u16 = 2;

/// Menu input, already decoded from keys or pad buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuCommand {
    Up,
    Down,
    Confirm,
    Cancel,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuOutcome {
    Stay,
    Start,
    Quit,
}

/// Placement of one option, relative to the menu origin.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ItemLayout {
    pub label_col: u16,
    pub row: u16,
    /// Selection bar: starting column and width.
    pub bar_col: u16,
    pub bar_width: u16,
}

#[derive(Clone, Debug)]
pub struct Menu {
    options: Vec<String>,
    selected: usize,
    pub title_col: u16,
    pub items: Vec<ItemLayout>,
    pub width: u16,
    pub height: u16,
}

impl Menu {
    pub fn new<S: AsRef<str>>(options: &[S]) -> Self {
        let options: Vec<String> = options.iter().map(|s| s.as_ref().to_string()).collect();
        let label_width = options.iter().map(|s| s.chars().count()).max().unwrap_or(0) as u16;
        let width = (label_width + PAD * 2).max(TITLE.len() as u16);

        let items = (0..options.len() as u16)
            .map(|i| ItemLayout {
                label_col: PAD,
                row: 1 + TITLE_GAP + i,
                bar_col: 0,
                bar_width: width,
            })
            .collect::<Vec<_>>();

        Menu {
            selected: 0,
            title_col: (width - TITLE.len() as u16) / 2,
            height: 1 + TITLE_GAP + items.len() as u16,
            items,
            width,
            options,
        }
    }

    /// The Start / Quit menu shown before a session.
    pub fn main_menu() -> Self {
        Menu::new(&["Start", "Quit"])
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Move the selection by `delta`, wrapping at both ends.
    pub fn step(&mut self, delta: i32) {
        let n = self.options.len() as i32;
        if n == 0 {
            return;
        }
        self.selected = (self.selected as i32 + delta).rem_euclid(n) as usize;
    }

    pub fn apply(&mut self, cmd: MenuCommand) -> MenuOutcome {
        match cmd {
            MenuCommand::Up => {
                self.step(-1);
                MenuOutcome::Stay
            }
            MenuCommand::Down => {
                self.step(1);
                MenuOutcome::Stay
            }
            MenuCommand::Confirm if self.options.is_empty() => MenuOutcome::Stay,
            MenuCommand::Confirm => match self.selected {
                0 => MenuOutcome::Start,
                1 => MenuOutcome::Quit,
                _ => MenuOutcome::Stay,
            },
            MenuCommand::Cancel => MenuOutcome::Quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_on_first_option() {
        let m = Menu::main_menu();
        assert_eq!(m.selected(), 0);
        assert_eq!(m.options(), &["Start".to_string(), "Quit".to_string()]);
    }

    #[test]
    fn up_from_top_wraps_to_last() {
        let mut m = Menu::main_menu();
        assert_eq!(m.apply(MenuCommand::Up), MenuOutcome::Stay);
        assert_eq!(m.selected(), 1);
    }

    #[test]
    fn down_from_last_wraps_to_top() {
        let mut m = Menu::main_menu();
        m.apply(MenuCommand::Down);
        m.apply(MenuCommand::Down);
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn confirm_start_and_quit() {
        let mut m = Menu::main_menu();
        assert_eq!(m.apply(MenuCommand::Confirm), MenuOutcome::Start);
        m.apply(MenuCommand::Down);
        assert_eq!(m.apply(MenuCommand::Confirm), MenuOutcome::Quit);
    }

    #[test]
    fn cancel_always_quits() {
        let mut m = Menu::main_menu();
        assert_eq!(m.apply(MenuCommand::Cancel), MenuOutcome::Quit);
    }

    #[test]
    fn menus_do_not_share_options() {
        let a = Menu::new(&["One"]);
        let b = Menu::main_menu();
        assert_eq!(a.options().len(), 1);
        assert_eq!(b.options().len(), 2);
        assert_eq!(a.items.len(), 1);
        assert_eq!(b.items.len(), 2);
    }

    #[test]
    fn layout_stacks_options_under_title() {
        let m = Menu::main_menu();
        assert_eq!(m.width, 9);
        assert_eq!(m.title_col, 0);
        assert_eq!(m.items[0].row, 3);
        assert_eq!(m.items[1].row, 4);
        assert_eq!(m.height, 5);
        assert!(m.items.iter().all(|it| it.bar_width == m.width));
    }

    #[test]
    fn empty_menu_is_inert() {
        let mut m = Menu::new::<&str>(&[]);
        m.step(3);
        assert_eq!(m.selected(), 0);
        assert_eq!(m.apply(MenuCommand::Confirm), MenuOutcome::Stay);
    }

    proptest! {
        #[test]
        fn selection_stays_in_range(moves in proptest::collection::vec(-5i32..5, 0..50)) {
            let mut m = Menu::new(&["a", "b", "c"]);
            for d in moves {
                m.step(d);
                prop_assert!(m.selected() < 3);
            }
        }
    }
}
