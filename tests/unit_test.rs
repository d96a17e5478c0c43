// Unit tests for sacco-admin
// These work through the public API of the library crate.

#[cfg(test)]
mod table_tests {
    use sacco_admin::resources::{Lookups, Member, Resource};
    use sacco_admin::table::{DataTable, SortDirection, TableConfig};
    use serde_json::json;

    fn members(n: usize) -> Vec<Member> {
        (1..=n)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "firstName": format!("Member{i:02}"),
                    "lastName": if i % 2 == 0 { "Wanjiru" } else { "Otieno" },
                    "memberNumber": format!("M-{i:03}"),
                    "status": "ACTIVE"
                }))
                .unwrap()
            })
            .collect()
    }

    fn table(page_size: usize) -> DataTable<Member> {
        let mut t = DataTable::new(Member::columns(), TableConfig::default());
        t.set_page_size(page_size);
        t
    }

    #[test]
    fn search_is_case_insensitive_across_columns() {
        let rows = members(6);
        let mut t = table(10);
        t.set_query("wanJIRU");
        let hits = t.filter(&rows, &Lookups::default());
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|m| m.last_name == "Wanjiru"));
    }

    #[test]
    fn sort_toggles_between_directions() {
        let rows = members(3);
        let mut t = table(10);
        assert!(t.toggle_sort(0));
        assert_eq!(t.state().sort, Some((0, SortDirection::Asc)));
        assert!(t.toggle_sort(0));
        assert_eq!(t.state().sort, Some((0, SortDirection::Desc)));
        let arranged = t.arrange(&rows, &Lookups::default());
        assert_eq!(arranged[0].member_number.as_deref(), Some("M-003"));
    }

    #[test]
    fn pagination_clamps_when_filter_shrinks() {
        let rows = members(25);
        let mut t = table(10);
        t.next_page(rows.len());
        t.next_page(rows.len());
        let view = t.view(&rows, &Lookups::default(), false);
        assert_eq!(view.page, 2);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.rows.len(), 5);

        t.set_query("Member01");
        let view = t.view(&rows, &Lookups::default(), false);
        assert_eq!(view.total, 1);
        assert_eq!(view.page, 0);
        assert_eq!(view.page_count, 1);
    }

    #[test]
    fn empty_set_still_has_one_page() {
        let rows: Vec<Member> = Vec::new();
        let t = table(10);
        let view = t.view(&rows, &Lookups::default(), false);
        assert!(view.is_empty());
        assert_eq!(view.page_count, 1);
        let loading = t.view(&rows, &Lookups::default(), true);
        assert!(!loading.is_empty());
    }
}

#[cfg(test)]
mod routing_tests {
    use sacco_admin::routes::{AdminPage, Route, guard};

    #[test]
    fn every_admin_page_round_trips_through_its_path() {
        for page in AdminPage::ALL {
            let route = Route::Admin(page);
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn guard_only_redirects_gated_routes() {
        assert_eq!(
            guard(Route::Admin(AdminPage::Loans), false),
            Route::Login { session_expired: false }
        );
        assert_eq!(guard(Route::UserDashboard, false), Route::login());
        assert_eq!(guard(Route::ForgotPassword, false), Route::ForgotPassword);
        assert_eq!(
            guard(Route::Admin(AdminPage::Loans), true),
            Route::Admin(AdminPage::Loans)
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert!(matches!(Route::parse("/admin/unknown"), Route::NotFound(_)));
    }
}

#[cfg(test)]
mod dialog_tests {
    use sacco_admin::dialog::{DialogMode, DialogState, RowAction, Target};
    use sacco_admin::form::{FieldKind, FieldSpec, FormState};
    use sacco_admin::resources::RecordId;

    fn form() -> FormState {
        FormState::new(vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal),
        ])
    }

    #[test]
    fn create_submit_then_fail_keeps_values() {
        let mut d = DialogState::default();
        d.open_create(form());
        let f = d.form_mut().unwrap();
        for c in "Savings".chars() {
            f.input(c);
        }
        let submission = d.submit().unwrap().unwrap();
        assert_eq!(submission.mode, DialogMode::Create);
        assert!(d.in_flight());
        assert!(!d.cancel());

        d.fail("Duplicate name");
        match &d {
            DialogState::Open { form, error, .. } => {
                assert_eq!(form.value("name"), Some("Savings"));
                assert_eq!(error.as_deref(), Some("Duplicate name"));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(d.cancel());
        assert_eq!(d, DialogState::Closed);
    }

    #[test]
    fn invalid_amount_blocks_submit() {
        let mut d = DialogState::default();
        d.open_create(form());
        let f = d.form_mut().unwrap();
        f.set("name", "X");
        f.set("amount", "-4");
        assert!(d.submit().unwrap().is_err());
        assert!(matches!(d, DialogState::Open { .. }));
    }

    #[test]
    fn delete_confirmation_flow() {
        let mut d = DialogState::default();
        let target = Target {
            id: RecordId::Num(9),
            label: "Jane Doe".into(),
        };
        d.confirm_delete(target.clone());
        assert_eq!(d.begin_delete(), Some(target));
        assert!(d.in_flight());
        d.succeed();
        assert_eq!(d, DialogState::Closed);
    }

    #[test]
    fn edit_from_row_menu_is_returned_to_caller() {
        let mut d = DialogState::default();
        d.open_menu(
            Target {
                id: RecordId::Num(1),
                label: "Loan #1".into(),
            },
            vec![RowAction::Edit, RowAction::Delete],
        );
        d.menu_move(true);
        let (_, action) = d.choose().unwrap();
        assert_eq!(action, RowAction::Delete);
    }
}

#[cfg(test)]
mod cache_tests {
    use sacco_admin::ApiError;
    use sacco_admin::query::QueryCache;
    use std::sync::Arc;

    #[test]
    fn invalidate_marks_stale_but_keeps_data() {
        let mut cache = QueryCache::new();
        assert!(cache.needs_fetch("members"));
        assert!(cache.begin_fetch("members"));
        assert!(!cache.begin_fetch("members"));
        cache.settle("members", Ok(Arc::new(vec![1u32, 2, 3])));
        assert!(!cache.needs_fetch("members"));

        cache.invalidate("members");
        assert!(cache.needs_fetch("members"));
        assert_eq!(cache.get::<Vec<u32>>("members").map(Vec::len), Some(3));
    }

    #[test]
    fn errors_are_kept_until_refetch() {
        let mut cache = QueryCache::new();
        cache.begin_fetch("loans");
        cache.settle("loans", Err(ApiError::Transport("connection refused".into())));
        assert!(cache.error("loans").is_some());
        assert!(!cache.is_loading("loans"));
    }
}

#[cfg(test)]
mod session_tests {
    use sacco_admin::session::{Session, SessionStore};

    #[test]
    fn session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.conf");
        let store = SessionStore::load(&path).unwrap();
        assert!(!store.is_authenticated());
        store.store(Session {
            token: Some("abc".into()),
            user_id: Some("5".into()),
            role: Some("ADMIN".into()),
        });

        let reloaded = SessionStore::load(&path).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("abc"));
        assert_eq!(reloaded.snapshot().role.as_deref(), Some("ADMIN"));

        reloaded.expire();
        assert!(reloaded.take_expired());
        assert!(!reloaded.take_expired());
        assert!(!SessionStore::load(&path).unwrap().is_authenticated());
    }
}

#[cfg(test)]
mod notification_tests {
    use chrono::Utc;
    use sacco_admin::notify::NotificationFeed;

    #[test]
    fn feed_mark_and_remove() {
        let mut feed = NotificationFeed::seeded(Utc::now());
        let total = feed.items().len();
        assert!(feed.unread() > 0);
        let id = feed.items()[0].id.clone();
        assert!(feed.remove(&id));
        assert_eq!(feed.items().len(), total - 1);
        feed.mark_all_read();
        assert_eq!(feed.unread(), 0);
    }
}

#[cfg(test)]
mod keymap_tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use sacco_admin::app::keymap::{KeyAction, Keymap};

    #[test]
    fn file_overrides_replace_default_bindings() {
        let km = Keymap::parse("NewRecord = a\n");
        assert_eq!(
            km.resolve(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(KeyAction::NewRecord)
        );
        assert_eq!(
            km.resolve(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(KeyAction::Quit)
        );
    }
}
