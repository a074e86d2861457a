#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        fs,
        path::PathBuf,
    };

    use crate::{
        core::CartomancyType,
        presets::{
            builtin::{
                builtin_presets,
                normalize_key,
                DEFAULT_COURTS,
                DEFAULT_SUIT_NAMES,
                PIP_WORDS,
                RWS_MAJORS,
            },
            import::{
                find_card_back_image,
                is_card_back_file,
                preview_import,
                preview_import_with_metadata,
            },
            resolver::{
                card_metadata,
                card_sort_order,
                map_filename_to_card,
                substitute_suit_name,
            },
            Preset,
            PresetLibrary,
            CUSTOM_PREFIX,
        },
    };

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir().join(format!("tarologue-test-{}.json", uuid::Uuid::new_v4()))
    }

    fn library() -> PresetLibrary {
        PresetLibrary::with_store_path(temp_store_path())
    }

    fn rws(lib: &PresetLibrary) -> &Preset {
        lib.get("Tarot (RWS Ordering)").expect("built-in RWS preset")
    }

    /// All 78 canonical RWS names in their natural order.
    fn full_rws_deck() -> Vec<String> {
        let mut names: Vec<String> = RWS_MAJORS.iter().map(|s| s.to_string()).collect();
        for suit in DEFAULT_SUIT_NAMES {
            for word in PIP_WORDS.iter().chain(DEFAULT_COURTS.iter()) {
                names.push(format!("{} of {}", crate::core::utils::title_case(word), suit));
            }
        }
        names
    }

    #[test]
    fn normalization_is_idempotent() {
        for stem in ["Ace of Wands", "w_01", "The-Fool", "c05.big", "  Strength  ", "08"] {
            let once = normalize_key(stem);
            assert_eq!(normalize_key(&once), once, "stem: {stem:?}");
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let lib = library();
        let preset = rws(&lib);
        for _ in 0..3 {
            assert_eq!(map_filename_to_card("w01.jpg", Some(preset), None), "Ace of Wands");
        }
    }

    #[test]
    fn fallback_is_total() {
        let lib = library();
        let filenames =
            ["w01.jpg", "completely-unknown_thing.png", "x.webp", "weird..name..png", "42.gif"];

        for filename in filenames {
            let with_preset = map_filename_to_card(filename, rws(&lib).into(), None);
            assert!(!with_preset.is_empty(), "empty result for {filename:?}");

            // Nonexistent preset behaves like "no mappings".
            let without = map_filename_to_card(filename, lib.get("No Such Preset"), None);
            assert!(!without.is_empty(), "empty fallback for {filename:?}");
        }
    }

    #[test]
    fn filename_variants_resolve_to_one_canonical_name() {
        let lib = library();
        let preset = rws(&lib);
        for filename in ["w01.jpg", "wands01.png", "AceOfWands.png", "ace_of_wands.jpg"] {
            assert_eq!(
                map_filename_to_card(filename, Some(preset), None),
                "Ace of Wands",
                "filename: {filename:?}"
            );
        }
    }

    #[test]
    fn trailing_number_rule_matches_padded_stems() {
        let lib = library();
        let preset = rws(&lib);
        assert_eq!(map_filename_to_card("rws08.jpg", Some(preset), None), "Strength");
        assert_eq!(map_filename_to_card("card_08_final.png", Some(preset), None), "Strength");
        // Digits in the middle don't count once digits appear again later.
        assert_eq!(map_filename_to_card("deck2_card.png", Some(preset), None), "The High Priestess");
    }

    #[test]
    fn numbering_traditions_disagree_on_eight() {
        let lib = library();
        let rws_name = lib.map_filename_to_card("08.jpg", "Tarot (RWS Ordering)", None);
        let old_name = lib.map_filename_to_card("08.jpg", "Tarot (Pre-Golden Dawn Ordering)", None);
        assert_eq!(rws_name, "Strength");
        assert_eq!(old_name, "Justice");
    }

    #[test]
    fn custom_suit_names_substitute_once() {
        let mut custom = HashMap::new();
        custom.insert("pentacles".to_string(), "Disks".to_string());

        assert_eq!(substitute_suit_name("Knight of Pentacles", &custom), "Knight of Disks");
        assert_eq!(substitute_suit_name("The Fool", &custom), "The Fool");

        let lib = library();
        assert_eq!(
            lib.map_filename_to_card("p11.png", "Tarot (RWS Ordering)", Some(&custom)),
            "Knight of Disks"
        );
    }

    #[test]
    fn domain_sort_orders_the_full_deck() {
        let lib = library();
        let preset = rws(&lib);
        let deck = full_rws_deck();

        let scores: Vec<i64> =
            deck.iter().map(|name| card_sort_order(name, Some(preset), None)).collect();

        // Majors 0-21 in Fool -> World order.
        assert_eq!(&scores[..22], &(0..22).collect::<Vec<i64>>()[..]);

        // Suits in hundred blocks, ace -> king.
        for (block, base) in [(22, 100), (36, 200), (50, 300), (64, 400)] {
            let expected: Vec<i64> = (base..base + 14).collect();
            assert_eq!(&scores[block..block + 14], &expected[..]);
        }

        // Total order: no two cards share a score.
        let mut dedup = scores.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), deck.len());
    }

    #[test]
    fn sort_handles_articles_and_case() {
        let lib = library();
        let preset = rws(&lib);
        assert_eq!(card_sort_order("the fool", Some(preset), None), 0);
        assert_eq!(card_sort_order("Fool", Some(preset), None), 0);
        assert_eq!(card_sort_order("THE WORLD", Some(preset), None), 21);
    }

    #[test]
    fn thoth_trumps_land_in_the_fixed_table() {
        let lib = library();
        let thoth = lib.get("Tarot (Thoth)").unwrap();
        assert_eq!(card_sort_order("Adjustment", Some(thoth), None), 8);
        assert_eq!(card_sort_order("Lust", Some(thoth), None), 11);
        assert_eq!(card_sort_order("The Universe", Some(thoth), None), 21);
        // Thoth pips use the tradition's suit names.
        assert_eq!(card_sort_order("Ace of Disks", Some(thoth), None), 400);

        // The swapped trumps keep Thoth numbering but link across the swap.
        let lust = card_metadata("Lust", Some(thoth), None);
        assert_eq!(lust.sort_order, 11);
        assert_eq!(lust.archetype.as_deref(), Some("Strength"));
        let adjustment = card_metadata("Adjustment", Some(thoth), None);
        assert_eq!(adjustment.sort_order, 8);
        assert_eq!(adjustment.archetype.as_deref(), Some("Justice"));
    }

    #[test]
    fn suit_without_rank_sorts_between_pips_and_unknown() {
        let lib = library();
        let preset = rws(&lib);
        assert_eq!(card_sort_order("Mystery of Cups", Some(preset), None), 250);
        assert_eq!(card_sort_order("Completely Unknown", Some(preset), None), 999);
    }

    #[test]
    fn metadata_for_majors_minors_and_unknowns() {
        let lib = library();
        let preset = rws(&lib);

        let fool = card_metadata("The Fool", Some(preset), None);
        assert_eq!(fool.archetype.as_deref(), Some("The Fool"));
        assert_eq!(fool.rank.as_deref(), Some("0"));
        assert_eq!(fool.suit, None);
        assert_eq!(fool.sort_order, 0);

        let five = card_metadata("Five of Cups", Some(preset), None);
        assert_eq!(five.archetype.as_deref(), Some("Five of Cups"));
        assert_eq!(five.rank.as_deref(), Some("205"));
        assert_eq!(five.suit.as_deref(), Some("Cups"));
        assert_eq!(five.sort_order, 204);

        let unknown = card_metadata("Unknown Card", Some(preset), None);
        assert_eq!(unknown.archetype, None);
        assert_eq!(unknown.rank, None);
        assert_eq!(unknown.suit, None);
        assert_eq!(unknown.sort_order, 999);
    }

    #[test]
    fn thoth_metadata_links_back_to_default_archetype() {
        let lib = library();
        let thoth = lib.get("Tarot (Thoth)").unwrap();

        let name = map_filename_to_card("p01.png", Some(thoth), None);
        assert_eq!(name, "Ace of Disks");

        let meta = card_metadata(&name, Some(thoth), None);
        assert_eq!(meta.archetype.as_deref(), Some("Ace of Pentacles"));
        assert_eq!(meta.suit.as_deref(), Some("Disks"));
        assert_eq!(meta.sort_order, 400);
    }

    #[test]
    fn lenormand_resolves_and_sorts_by_number() {
        let lib = library();
        let lenormand = lib.get("Lenormand").unwrap();

        assert_eq!(map_filename_to_card("03.png", Some(lenormand), None), "Ship");
        assert_eq!(map_filename_to_card("rider.jpg", Some(lenormand), None), "Rider");

        let meta = card_metadata("Ship", Some(lenormand), None);
        assert_eq!(meta.rank.as_deref(), Some("3"));
        assert_eq!(meta.sort_order, 2);
    }

    #[test]
    fn playing_cards_resolve_with_suit_letters() {
        let lib = library();
        let playing = lib.get("Playing Cards").unwrap();

        assert_eq!(map_filename_to_card("h01.png", Some(playing), None), "Ace of Hearts");
        assert_eq!(map_filename_to_card("s13.png", Some(playing), None), "King of Spades");

        let meta = card_metadata("King of Spades", Some(playing), None);
        assert_eq!(meta.suit.as_deref(), Some("Spades"));
        assert_eq!(meta.sort_order, 413);
    }

    // ── Registry ──

    #[test]
    fn builtin_override_and_revert_round_trip() {
        let mut lib = library();
        let name = "Tarot (RWS Ordering)";
        let pristine = lib.get(name).unwrap().clone();

        let mut mappings = HashMap::new();
        mappings.insert("00".to_string(), "The Jester".to_string());
        lib.add_custom(name, CartomancyType::Tarot, mappings, "house rules", HashMap::new());

        assert!(lib.is_builtin(name));
        assert!(lib.is_customized(name));
        assert_eq!(lib.map_filename_to_card("00.png", name, None), "The Jester");

        assert!(lib.delete_custom(name));
        assert!(!lib.is_customized(name));
        assert_eq!(lib.get(name), Some(&pristine));
        assert_eq!(lib.map_filename_to_card("00.png", name, None), "The Fool");
    }

    #[test]
    fn non_shadowing_customs_get_a_display_prefix() {
        let mut lib = library();
        lib.add_custom(
            "My Oracle",
            CartomancyType::Oracle,
            HashMap::new(),
            "",
            HashMap::new(),
        );

        let all = lib.all_presets();
        let display_key = format!("{}My Oracle", CUSTOM_PREFIX);
        assert!(all.iter().any(|(name, _)| *name == display_key));

        // Resolvable by either name.
        assert!(lib.get("My Oracle").is_some());
        assert!(lib.get(&display_key).is_some());
        assert!(!lib.is_builtin("My Oracle"));
    }

    #[test]
    fn shadowing_custom_replaces_builtin_in_listing() {
        let mut lib = library();
        let name = "Lenormand";
        lib.add_custom(name, CartomancyType::Lenormand, HashMap::new(), "mine", HashMap::new());

        let all = lib.all_presets();
        let entry = all.iter().find(|(n, _)| n == name).unwrap();
        assert_eq!(entry.1.description, "mine");
        // No duplicate under the Custom prefix.
        assert!(!all.iter().any(|(n, _)| n == &format!("{}{}", CUSTOM_PREFIX, name)));
    }

    #[test]
    fn customs_persist_across_reload() {
        let path = temp_store_path();
        {
            let mut lib = PresetLibrary::with_store_path(path.clone());
            lib.add_custom(
                "My Oracle",
                CartomancyType::Oracle,
                HashMap::new(),
                "persisted",
                HashMap::new(),
            );
        }

        let reloaded = PresetLibrary::with_store_path(path.clone());
        assert_eq!(reloaded.get("My Oracle").unwrap().description, "persisted");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn replace_custom_is_a_single_edit() {
        let path = temp_store_path();
        let mut lib = PresetLibrary::with_store_path(path.clone());
        lib.add_custom("Old Name", CartomancyType::Oracle, HashMap::new(), "", HashMap::new());

        let body = Preset {
            cartomancy_type: CartomancyType::Oracle,
            mappings: HashMap::new(),
            description: "renamed".to_string(),
            suit_names: HashMap::new(),
        };
        lib.replace_custom("Old Name", "New Name", body);

        assert!(lib.get("Old Name").is_none());
        assert_eq!(lib.get("New Name").unwrap().description, "renamed");

        // Both halves of the edit landed in one persisted document.
        let reloaded = PresetLibrary::with_store_path(path.clone());
        assert!(reloaded.get("Old Name").is_none());
        assert!(reloaded.get("New Name").is_some());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unknown_preset_name_resolves_to_nothing() {
        let lib = library();
        assert!(lib.get("No Such Preset").is_none());
        assert_eq!(lib.map_filename_to_card("w01.jpg", "No Such Preset", None), "W01");
    }

    #[test]
    fn builtin_catalogue_is_complete() {
        let builtins = builtin_presets();
        let rws = &builtins.iter().find(|(n, _)| n == "Tarot (RWS Ordering)").unwrap().1;

        // 78 distinct canonical names behind the aliases.
        let mut names: Vec<&String> = rws.mappings.values().collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 78);

        let lenormand = &builtins.iter().find(|(n, _)| n == "Lenormand").unwrap().1;
        let mut lenormand_names: Vec<&String> = lenormand.mappings.values().collect();
        lenormand_names.sort();
        lenormand_names.dedup();
        assert_eq!(lenormand_names.len(), 36);
    }

    // ── Import preview ──

    fn temp_folder(files: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tarologue-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"").unwrap();
        }
        dir
    }

    #[test]
    fn preview_sorts_cards_into_deck_order() {
        let lib = library();
        let dir = temp_folder(&["unknown_card.png", "s14.png", "w01.jpg", "c05.png"]);

        let rows = preview_import(&dir, lib.get("Tarot (RWS Ordering)"), None).unwrap();
        let expected = vec![
            ("w01.jpg", "Ace of Wands", 100),
            ("c05.png", "Five of Cups", 204),
            ("s14.png", "King of Swords", 313),
            ("unknown_card.png", "Unknown Card", 999),
        ];
        let got: Vec<(&str, &str, i64)> =
            rows.iter().map(|(f, n, s)| (f.as_str(), n.as_str(), *s)).collect();
        assert_eq!(got, expected);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn preview_with_metadata_excludes_the_card_back() {
        let lib = library();
        let dir = temp_folder(&["w01.jpg", "back.png", "notes.txt"]);

        let back = find_card_back_image(&dir).unwrap();
        assert_eq!(back.as_deref(), Some("back.png"));

        let rows =
            preview_import_with_metadata(&dir, lib.get("Tarot (RWS Ordering)"), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card_name, "Ace of Wands");
        assert_eq!(rows[0].rank.as_deref(), Some("101"));
        assert_eq!(rows[0].suit.as_deref(), Some("Wands"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn card_back_detection() {
        assert!(is_card_back_file("back.png"));
        assert!(is_card_back_file("Back01.jpg"));
        assert!(is_card_back_file("card_back.png"));
        assert!(is_card_back_file("cover.webp"));
        assert!(!is_card_back_file("backdrop.png"));
        assert!(!is_card_back_file("w01.jpg"));
    }

    #[test]
    fn missing_folder_is_the_only_import_error() {
        let lib = library();
        let missing = std::env::temp_dir().join("tarologue-test-does-not-exist");
        assert!(preview_import(&missing, lib.get("Tarot (RWS Ordering)"), None).is_err());
    }
}
