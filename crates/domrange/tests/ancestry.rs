use domrange::{Member, Range, RangeError, RangeHost};
use memdom::{MemDom, NodeId};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn host_with_container() -> (Rc<RangeHost<MemDom>>, NodeId) {
    let host = RangeHost::new(MemDom::new());
    let dom = host.tree();
    let container = dom.create_element("div");
    dom.append_child(dom.document(), container).unwrap();
    (host, container)
}

#[test]
fn nested_ranges_contain_inward_only() {
    let (host, c) = host_with_container();
    let n = host.tree().create_element("p");
    let inner = Range::new(&host, vec![Member::node(n)]).unwrap();
    let mid = Range::new(&host, vec![inner.clone().into()]).unwrap();
    let outer = Range::new(&host, vec![mid.clone().into()]).unwrap();
    outer.attach(&c, None).unwrap();

    assert_eq!(outer.contains_element(&n), Ok(true));
    assert_eq!(mid.contains_element(&n), Ok(true));
    assert_eq!(inner.contains_element(&n), Ok(true));
    assert_eq!(outer.contains_range(&mid), Ok(true));
    assert_eq!(outer.contains_range(&inner), Ok(true));
    assert_eq!(inner.contains_range(&outer), Ok(false));
    assert_eq!(mid.contains_range(&outer), Ok(false));
    assert_eq!(outer.contains_range(&outer), Ok(false));
}

#[test]
fn host_descendants_of_members_are_contained() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let li = dom.create_element("li");
    let span = dom.create_element("span");
    let text = dom.create_text("deep");
    dom.append_child(li, span).unwrap();
    dom.append_child(span, text).unwrap();
    let range = Range::new(&host, vec![Member::node(li)]).unwrap();
    range.attach(&c, None).unwrap();

    assert_eq!(range.contains_element(&span), Ok(true));
    assert_eq!(range.contains_element(&text), Ok(true));
    assert_eq!(range.contains_element(&c), Ok(false));
    assert_eq!(range.contains_element(&dom.document()), Ok(false));
}

#[test]
fn sibling_ranges_do_not_contain_each_other() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let (e1, e2, stray) = (
        dom.create_element("b"),
        dom.create_element("b"),
        dom.create_element("i"),
    );
    let r1 = Range::new(&host, vec![Member::node(e1)]).unwrap();
    let r2 = Range::new(&host, vec![Member::node(e2)]).unwrap();
    r1.attach(&c, None).unwrap();
    dom.append_child(c, stray).unwrap();
    r2.attach(&c, None).unwrap();

    assert_eq!(r1.contains_element(&e1), Ok(true));
    assert_eq!(r1.contains_element(&e2), Ok(false));
    assert_eq!(r1.contains_element(&stray), Ok(false));
    assert_eq!(r1.contains_range(&r2), Ok(false));
    assert_eq!(r2.contains_range(&r1), Ok(false));
}

#[test]
fn range_attached_inside_a_member_is_contained() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let ul = dom.create_element("ul");
    let li = dom.create_element("li");
    let outer = Range::new(&host, vec![Member::node(ul)]).unwrap();
    outer.attach(&c, None).unwrap();

    let items = Range::new(&host, vec![Member::node(li)]).unwrap();
    items.attach(&ul, None).unwrap();

    assert_eq!(outer.contains_range(&items), Ok(true));
    assert_eq!(outer.contains_element(&li), Ok(true));
    assert_eq!(items.contains_range(&outer), Ok(false));
    assert_eq!(host.range_for_node(&li), Some(items.clone()));

    items.detach().unwrap();
    assert_eq!(outer.contains_range(&items), Ok(false));
}

#[test]
fn containment_queries_need_an_attached_range() {
    let (host, c) = host_with_container();
    let a = host.tree().create_element("a");
    let detached = Range::new(&host, vec![Member::node(a)]).unwrap();
    let attached = Range::empty(&host);
    attached.attach(&c, None).unwrap();

    assert!(matches!(
        detached.contains_element(&a),
        Err(RangeError::InvalidState(_))
    ));
    assert!(matches!(
        detached.contains_range(&attached),
        Err(RangeError::InvalidState(_))
    ));
    assert!(matches!(detached.select("a"), Err(RangeError::InvalidState(_))));
    assert_eq!(attached.contains_range(&detached), Ok(false));
}

#[test]
fn range_for_node_walks_up_to_the_owning_range() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let li = dom.create_element("li");
    let span = dom.create_element("span");
    dom.append_child(li, span).unwrap();
    let inner = Range::new(&host, vec![Member::node(li)]).unwrap();
    let outer = Range::new(&host, vec![inner.clone().into()]).unwrap();
    let empty = Range::empty(&host);
    outer.attach(&c, None).unwrap();
    empty.attach(&c, None).unwrap();

    assert_eq!(host.range_for_node(&li), Some(inner.clone()));
    assert_eq!(host.range_for_node(&span), Some(inner));
    assert_eq!(host.range_for_node(&empty.first_node().unwrap()), None);
    assert_eq!(host.range_for_node(&c), None);
}

#[test]
fn select_filters_matches_to_the_range() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let a = dom.create_element_with("li", &[("class", "item")]);
    let b = dom.create_element_with("li", &[("class", "item")]);
    let nested_hit = dom.create_element_with("em", &[("class", "item")]);
    let outside = dom.create_element_with("li", &[("class", "item")]);
    dom.append_child(b, nested_hit).unwrap();
    dom.append_child(c, outside).unwrap();

    let inner = Range::new(&host, vec![Member::node(b)]).unwrap();
    let range = Range::new(&host, vec![Member::node(a), inner.into()]).unwrap();
    range.attach(&c, None).unwrap();

    assert_eq!(range.select(".item"), Ok(vec![a, b, nested_hit]));
    assert_eq!(range.select("li.item"), Ok(vec![a, b]));
    assert_eq!(range.select("li em"), Ok(vec![nested_hit]));
    assert_eq!(range.select("table"), Ok(Vec::new()));
}

#[test]
fn select_reports_bad_patterns_and_unsearchable_roots() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let range = Range::new(&host, vec![Member::node(dom.create_element("p"))]).unwrap();
    range.attach(&c, None).unwrap();
    assert!(matches!(
        range.select("p["),
        Err(RangeError::InvalidArgument(_))
    ));

    let fragment = dom.create_fragment();
    let offscreen = Range::new(&host, vec![Member::node(dom.create_element("p"))]).unwrap();
    offscreen.attach(&fragment, None).unwrap();
    assert!(matches!(
        offscreen.select("p"),
        Err(RangeError::UnsupportedOperation(_))
    ));
}

#[test]
fn fragment_rooted_range_answers_containment() {
    let (host, _) = host_with_container();
    let dom = host.tree();
    let fragment = dom.create_fragment();
    let (p, stray) = (dom.create_element("p"), dom.create_element("i"));
    dom.append_child(fragment, stray).unwrap();
    let range = Range::new(&host, vec![Member::node(p)]).unwrap();
    range.attach(&fragment, None).unwrap();

    assert_eq!(range.contains_element(&p), Ok(true));
    assert_eq!(range.contains_element(&stray), Ok(false));
}
