use proptest::prelude::*;
use resprefix::formats::{assets, markup, source};
use resprefix::references::Resolver;
use resprefix::traits::ReferenceScanner;
use resprefix::types::{RenameMapping, ResourceKey, ResourceType};

// Names never start with `v`, so no generated name carries the `vod_` prefix.
fn name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-u][a-z0-9_]{0,12}").expect("valid name regex")
}

fn suffix_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9_]{1,6}").expect("valid suffix regex")
}

fn mapping_of(res_type: ResourceType, name: &str) -> RenameMapping {
    let mut mapping = RenameMapping::new();
    mapping.insert(ResourceKey::new(res_type, name), format!("vod_{}", name));
    mapping
}

fn rewrite(scanner: &dyn ReferenceScanner, content: &str, mapping: &RenameMapping) -> String {
    let resolver = Resolver::new(mapping);
    scanner
        .rewrite(content, &|token| resolver.resolve(token))
        .expect("rewrite")
        .content
}

proptest! {
    #[test]
    fn prop_prefix_name_is_never_partially_rewritten(name in name_strategy(), suffix in suffix_strategy()) {
        let longer = format!("{}{}", name, suffix);
        let mapping = mapping_of(ResourceType::Drawable, &name);

        let xml = format!(r#"<a x="@drawable/{}" y="@drawable/{}"/>"#, name, longer);
        let out = rewrite(&markup::Format, &xml, &mapping);
        prop_assert_eq!(out, format!(r#"<a x="@drawable/vod_{}" y="@drawable/{}"/>"#, name, longer));

        let code = format!("f(R.drawable.{}, R.drawable.{});", longer, name);
        let out = rewrite(&source::Format, &code, &mapping);
        prop_assert_eq!(out, format!("f(R.drawable.{}, R.drawable.vod_{});", longer, name));
    }

    #[test]
    fn prop_rewrite_is_idempotent(name in name_strategy(), other in name_strategy()) {
        let mapping = mapping_of(ResourceType::String, &name);
        let xml = format!(
            r#"<resources><string name="t">@string/{} @string/{}</string></resources>"#,
            name, other
        );
        let once = rewrite(&markup::Format, &xml, &mapping);
        let twice = rewrite(&markup::Format, &once, &mapping);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_other_namespaces_are_untouched(name in name_strategy()) {
        let mapping = mapping_of(ResourceType::Layout, &name);
        let xml = format!(r#"<a x="@drawable/{0}" y="@android:layout/{0}" z="?attr/{0}"/>"#, name);
        let out = rewrite(&markup::Format, &xml, &mapping);
        prop_assert_eq!(out, xml);
    }

    #[test]
    fn prop_asset_paths_need_whole_path(name in name_strategy(), dir in name_strategy()) {
        let path = format!("images/{}.png", name);
        let content = format!(r#"<img src="{0}"><img src="{1}/{0}"><img src="{0}.bak">"#, path, dir);
        let tokens = assets::find_references(&content, [path.as_str()]);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].range.start, 10);
    }

    #[test]
    fn prop_source_lexer_never_panics(content in "\\PC{0,80}") {
        for token in source::find_references(&content) {
            prop_assert!(content.is_char_boundary(token.range.start));
            prop_assert_eq!(&content[token.range.clone()], token.name.as_str());
        }
    }
}
