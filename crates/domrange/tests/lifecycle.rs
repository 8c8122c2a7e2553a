use domrange::{Augmenter, Member, Range, RangeHost};
use memdom::{MemDom, NodeId};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Augmenter<MemDom> for Recorder {
    fn attach(&mut self, range: &Range<MemDom>, container: &NodeId) {
        assert!(range.is_attached());
        assert_eq!(range.host_parent(), Some(*container));
        self.log.borrow_mut().push(format!("{}:attach", self.name));
    }

    fn detach(&mut self, range: &Range<MemDom>, container: &NodeId) {
        assert!(!range.is_attached());
        assert_eq!(range.host_parent(), None);
        assert!(range.tree().parent_of(*container).is_some());
        self.log.borrow_mut().push(format!("{}:detach", self.name));
    }
}

/// Only overrides `attach`.
struct AttachCounter(Rc<RefCell<usize>>);

impl Augmenter<MemDom> for AttachCounter {
    fn attach(&mut self, _range: &Range<MemDom>, _container: &NodeId) {
        *self.0.borrow_mut() += 1;
    }
}

/// Fills its range with `node` whenever the range attaches empty.
struct Filler {
    node: NodeId,
    attaches: usize,
}

impl Augmenter<MemDom> for Filler {
    fn attach(&mut self, range: &Range<MemDom>, _container: &NodeId) {
        self.attaches += 1;
        if range.is_empty() {
            range.set_members(vec![Member::node(self.node)]).unwrap();
        }
    }
}

fn host_with_container() -> (Rc<RangeHost<MemDom>>, NodeId) {
    let host = RangeHost::new(MemDom::new());
    let dom = host.tree();
    let container = dom.create_element("div");
    dom.append_child(dom.document(), container).unwrap();
    (host, container)
}

fn recorded(range: &Range<MemDom>, names: &[&'static str]) -> Log {
    let log = Log::default();
    for &name in names {
        range.add_augmenter(Recorder {
            name,
            log: Rc::clone(&log),
        });
    }
    log
}

#[test]
fn hooks_fire_in_registration_order() {
    let (host, c) = host_with_container();
    let range = Range::empty(&host);
    let log = recorded(&range, &["first", "second"]);

    range.attach(&c, None).unwrap();
    range.detach().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["first:attach", "second:attach", "first:detach", "second:detach"]
    );
}

#[test]
fn nested_ranges_attach_before_their_parent_reports() {
    let (host, c) = host_with_container();
    let inner = Range::empty(&host);
    let outer = Range::new(&host, vec![inner.clone().into()]).unwrap();
    let log = Log::default();
    for (range, name) in [(&inner, "inner"), (&outer, "outer")] {
        range.add_augmenter(Recorder {
            name,
            log: Rc::clone(&log),
        });
    }

    outer.attach(&c, None).unwrap();
    outer.detach().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["inner:attach", "outer:attach", "inner:detach", "outer:detach"]
    );
}

#[test]
fn relocation_does_not_fire_hooks() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let (a, b) = (dom.create_element("a"), dom.create_element("b"));
    let inner = Range::new(&host, vec![Member::node(b)]).unwrap();
    let outer = Range::new(&host, vec![Member::node(a), inner.clone().into()]).unwrap();
    let inner_log = recorded(&inner, &["inner"]);
    let outer_log = recorded(&outer, &["outer"]);
    outer.attach(&c, None).unwrap();
    inner_log.borrow_mut().clear();
    outer_log.borrow_mut().clear();

    outer.move_member(1, 0).unwrap();
    outer.move_to(&c, None).unwrap();
    assert_eq!(dom.children(c), vec![b, a]);
    assert!(inner_log.borrow().is_empty());
    assert!(outer_log.borrow().is_empty());
}

#[test]
fn splices_fire_hooks_only_on_real_attach_changes() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let (a, b) = (dom.create_element("a"), dom.create_element("b"));
    let range = Range::empty(&host);
    let log = recorded(&range, &["r"]);
    range.attach(&c, None).unwrap();
    log.borrow_mut().clear();

    // Empty to non-empty goes through a full rebuild.
    range.add_member(Member::node(a), 0).unwrap();
    assert_eq!(*log.borrow(), vec!["r:detach", "r:attach"]);
    log.borrow_mut().clear();

    range.add_member(Member::node(b), 1).unwrap();
    range.remove_member(1).unwrap();
    assert!(log.borrow().is_empty());

    range.remove_member(0).unwrap();
    assert_eq!(*log.borrow(), vec!["r:detach", "r:attach"]);
    log.borrow_mut().clear();

    range.set_members(Vec::new()).unwrap();
    assert!(log.borrow().is_empty());

    range.set_members(vec![Member::node(a)]).unwrap();
    assert_eq!(*log.borrow(), vec!["r:detach", "r:attach"]);
}

#[test]
fn removed_nested_range_is_detached() {
    let (host, c) = host_with_container();
    let dom = host.tree();
    let a = dom.create_element("a");
    let inner = Range::empty(&host);
    let outer = Range::new(&host, vec![Member::node(a), inner.clone().into()]).unwrap();
    let log = recorded(&inner, &["inner"]);
    outer.attach(&c, None).unwrap();

    outer.remove_member(1).unwrap();
    assert!(!inner.is_attached());
    assert_eq!(*log.borrow(), vec!["inner:attach", "inner:detach"]);
    assert_eq!(dom.children(c), vec![a]);
}

#[test]
fn default_hooks_are_no_ops() {
    let (host, c) = host_with_container();
    let range = Range::empty(&host);
    let count = Rc::new(RefCell::new(0));
    let counter = range.add_augmenter(AttachCounter(Rc::clone(&count)));
    range.attach(&c, None).unwrap();
    range.detach().unwrap();
    range.attach(&c, None).unwrap();
    assert_eq!(*count.borrow(), 2);
    assert_eq!(Rc::strong_count(&counter), 2);
}

#[test]
fn stop_runs_callbacks_once_in_order() {
    let (host, _) = host_with_container();
    let range = Range::empty(&host);
    let log = Log::default();
    for name in ["subscription", "computation"] {
        let log = Rc::clone(&log);
        range.on_stop(move |stopped: &Range<MemDom>| {
            assert!(stopped.is_empty());
            log.borrow_mut().push(name.to_string());
        });
    }

    range.stop();
    range.stop();
    assert_eq!(*log.borrow(), vec!["subscription", "computation"]);

    let late = Rc::clone(&log);
    range.on_stop(move |_: &Range<MemDom>| late.borrow_mut().push("late".to_string()));
    range.stop();
    assert_eq!(*log.borrow(), vec!["subscription", "computation", "late"]);
}

#[test]
fn stop_callbacks_may_edit_the_range() {
    let (host, c) = host_with_container();
    let a = host.tree().create_element("a");
    let range = Range::new(&host, vec![Member::node(a)]).unwrap();
    range.attach(&c, None).unwrap();
    range.on_stop(|stopped: &Range<MemDom>| {
        stopped.detach().unwrap();
    });

    range.stop();
    assert!(!range.is_attached());
    assert_eq!(host.tree().children(c), Vec::<NodeId>::new());
}

#[test]
fn hook_may_edit_its_own_range() {
    let (host, c) = host_with_container();
    let a = host.tree().create_element("a");
    let range = Range::empty(&host);
    let filler = range.add_augmenter(Filler {
        node: a,
        attaches: 0,
    });

    range.attach(&c, None).unwrap();
    assert!(range.is_attached());
    assert_eq!(host.tree().children(c), vec![a]);
    assert_eq!(range.host_nodes().unwrap(), vec![a]);
    assert_eq!(filler.borrow().attaches, 1);

    // Outside a running hook, the filler fires again as usual.
    range.remove_member(0).unwrap();
    assert_eq!(filler.borrow().attaches, 2);
    assert_eq!(host.tree().children(c), vec![a]);
}
