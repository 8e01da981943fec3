use crossterm::event::{KeyCode, KeyModifiers};

use sifa_core::ClickTarget;

use crate::app::{App, Focus};

pub(crate) fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        handle_control(app, code);
        return;
    }

    let panel_open = app.query_focused() && app.form.panel().is_some_and(|p| p.is_visible());
    if panel_open && handle_panel_key(app, code) {
        return;
    }

    match code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::Down => app.cycle_focus(1),
        KeyCode::BackTab | KeyCode::Up => app.cycle_focus(-1),
        KeyCode::Enter => app.cycle_focus(1),
        KeyCode::Left => move_left(app),
        KeyCode::Right => move_right(app),
        KeyCode::Backspace => edit(app, |t| t.delete_back()),
        KeyCode::Char(c) => edit(app, |t| t.insert_char(c)),
        _ => {}
    }
}

fn handle_control(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('t') => app.toggle_mode(),
        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('a') => app.add_row(),
        KeyCode::Char('d') => app.remove_row(),
        _ => {}
    }
}

/// Keys the open suggestion panel takes over. Returns `false` to let the
/// key fall through to the input.
fn handle_panel_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Down => {
            if let Some(panel) = app.form.panel_mut() {
                panel.move_down();
            }
        }
        KeyCode::Up => {
            if let Some(panel) = app.form.panel_mut() {
                panel.move_up();
            }
        }
        KeyCode::Enter => app.pick_highlighted(),
        KeyCode::Esc => app.session.on_click(&mut app.form, ClickTarget::Elsewhere),
        _ => return false,
    }
    true
}

fn edit(app: &mut App, f: impl FnOnce(&mut sifa_core::TextValue)) {
    let Some(text) = app.focused_text_mut() else {
        return;
    };
    f(text);
    if app.query_focused() {
        app.session.on_input(&mut app.form);
    }
}

fn move_left(app: &mut App) {
    if let Some(text) = app.focused_text_mut() {
        text.move_left();
    } else if let Some(choice) = focused_choice(app) {
        choice.select_prev();
    }
}

fn move_right(app: &mut App) {
    if let Some(text) = app.focused_text_mut() {
        text.move_right();
    } else if let Some(choice) = focused_choice(app) {
        choice.select_next();
    }
}

fn focused_choice(app: &mut App) -> Option<&mut sifa_core::Choice> {
    match app.focus.clone()? {
        Focus::Field(id) => app.form.field_mut(id.as_str())?.as_choice_mut(),
        Focus::Cell { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use sifa_core::{
        FormMode, FormState, ProductDetails, SelectOption, SuggestConfig, Suggestion, ids,
    };
    use sifa_suggest::SuggestionFetcher;

    use super::*;

    struct CatalogFetcher;

    #[async_trait]
    impl SuggestionFetcher for CatalogFetcher {
        async fn fetch(&self, query: &str) -> Vec<Suggestion> {
            vec![
                Suggestion::Local {
                    id: "42".to_string(),
                    label: "Paracetamol 500mg".to_string(),
                    details: ProductDetails::default(),
                },
                Suggestion::External {
                    provider: "cima".to_string(),
                    label: format!("{query} externo"),
                    details: ProductDetails {
                        nombre: "Ibuprofeno".to_string(),
                        potencia: "400mg".to_string(),
                        forma: "tableta".to_string(),
                    },
                },
            ]
        }
    }

    fn order_app(create: bool) -> App {
        let form = FormState::medication_order(vec![SelectOption::new("7", "Aspirina")], create);
        App::new(form, Arc::new(CatalogFetcher), &SuggestConfig::default())
    }

    fn quick_app() -> App {
        App::new(
            FormState::product_quick(),
            Arc::new(CatalogFetcher),
            &SuggestConfig::default(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, code, KeyModifiers::NONE);
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key(app, KeyCode::Char(c), KeyModifiers::CONTROL);
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Let the debounce elapse and the fetch complete.
    async fn settle(app: &mut App) {
        sleep(Duration::from_millis(300)).await;
        app.drain_session_events();
        sleep(Duration::from_millis(10)).await;
        app.drain_session_events();
    }

    fn panel_visible(app: &App) -> bool {
        app.form.panel().is_some_and(|p| p.is_visible())
    }

    #[tokio::test(start_paused = true)]
    async fn typing_in_create_mode_opens_panel() {
        let mut app = order_app(true);
        assert!(app.query_focused());

        type_str(&mut app, "ibu");
        assert!(!panel_visible(&app));
        settle(&mut app).await;

        assert!(panel_visible(&app));
        assert_eq!(app.form.panel().unwrap().rows().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_on_external_row_fills_new_product() {
        let mut app = order_app(true);
        type_str(&mut app, "ibu");
        settle(&mut app).await;

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert!(!panel_visible(&app));
        assert_eq!(app.form.field(ids::NEW_NAME).unwrap().value(), "Ibuprofeno");
        assert_eq!(app.form.field(ids::NEW_STRENGTH).unwrap().value(), "400mg");
        assert_eq!(app.form.mode(), Some(FormMode::CreateNew));
    }

    #[tokio::test(start_paused = true)]
    async fn enter_on_local_row_selects_existing_and_moves_focus() {
        let mut app = order_app(true);
        type_str(&mut app, "para");
        settle(&mut app).await;

        press(&mut app, KeyCode::Enter);

        assert_eq!(app.form.mode(), Some(FormMode::SelectExisting));
        assert_eq!(app.form.selector_value(), Some("42"));
        assert_eq!(app.focus, Some(Focus::Field(ids::PRODUCT.into())));
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_t_switches_sections_and_focus() {
        let mut app = order_app(false);
        assert_eq!(app.focus, Some(Focus::Field(ids::PRODUCT.into())));

        ctrl(&mut app, 't');
        assert_eq!(app.form.mode(), Some(FormMode::CreateNew));
        assert!(app.query_focused());

        ctrl(&mut app, 't');
        assert_eq!(app.form.mode(), Some(FormMode::SelectExisting));
        assert_eq!(app.focus, Some(Focus::Field(ids::PRODUCT.into())));
    }

    #[tokio::test(start_paused = true)]
    async fn esc_dismisses_panel_before_quitting() {
        let mut app = order_app(true);
        type_str(&mut app, "ibu");
        settle(&mut app).await;

        press(&mut app, KeyCode::Esc);
        assert!(!panel_visible(&app));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn tab_away_hides_quick_form_panel_after_delay() {
        let mut app = quick_app();
        type_str(&mut app, "amo");
        settle(&mut app).await;
        assert!(panel_visible(&app));

        press(&mut app, KeyCode::Tab);
        app.drain_session_events();
        assert!(panel_visible(&app));

        sleep(Duration::from_millis(200)).await;
        app.drain_session_events();
        assert!(!panel_visible(&app));
    }

    #[tokio::test(start_paused = true)]
    async fn left_right_cycle_select_options() {
        let mut app = order_app(false);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.form.selector_value(), Some("7"));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_requires_filled_fields() {
        let mut app = order_app(false);
        ctrl(&mut app, 's');
        assert!(!app.should_quit);
        assert!(app.status_message.contains("producto"));

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Some(Focus::Field(ids::DOSE.into())));
        type_str(&mut app, "1 comp");
        ctrl(&mut app, 's');

        assert!(app.should_quit);
        let draft = app.submitted.unwrap();
        assert_eq!(draft.fields.get(ids::DOSE).map(String::as_str), Some("1 comp"));
    }

    #[tokio::test(start_paused = true)]
    async fn rows_are_added_edited_and_removed() {
        let mut app = order_app(false);
        ctrl(&mut app, 'a');
        assert_eq!(app.focus, Some(Focus::Cell { row: 0, cell: 0 }));
        type_str(&mut app, "08:00");

        ctrl(&mut app, 'a');
        assert_eq!(app.form.rows.len(), 2);
        ctrl(&mut app, 'd');
        assert_eq!(app.form.rows.len(), 1);
        assert_eq!(app.form.rows.schedule().len(), 1);
    }
}
