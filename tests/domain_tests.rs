use gryphon_warehouse::domains::inventory::*;
use gryphon_warehouse::domains::path_planning::Cell;
use gryphon_warehouse::domains::robot::*;

/// Route oracle with canned answers.
struct FixedOracle {
    approach: Option<Cell>,
    route: Vec<Cell>,
    static_route: Vec<Cell>,
}

impl FixedOracle {
    fn open(route: Vec<Cell>) -> Self {
        Self {
            approach: route.last().copied(),
            static_route: route.clone(),
            route,
        }
    }
}

impl RouteOracle for FixedOracle {
    fn approach_cell(&self, _target: Cell, _from: Cell) -> Option<Cell> {
        self.approach
    }

    fn plan_route(&self, _start: Cell, _goal: Cell, _avoid: Option<Cell>) -> Vec<Cell> {
        self.route.clone()
    }

    fn static_route(&self, _start: Cell, _goal: Cell) -> Vec<Cell> {
        self.static_route.clone()
    }
}

fn transfer(id: TaskId, from: Cell, to: Cell, item: &str, quantity: Quantity) -> Task {
    Task::pickup(id, from, item, quantity, TaskKind::Sort)
        .with_follow_up(Task::dropoff(id + 1, to, item, quantity, TaskKind::Sort))
}

#[test]
fn test_inventory_drops_zero_entries() {
    let mut inventory = Inventory::new();
    inventory.add("Widget", 3);
    inventory.add("Gadget", 0);
    assert_eq!(inventory.iter().count(), 1);

    assert!(inventory.remove("Widget", 3));
    assert!(inventory.is_empty());
    assert_eq!(inventory.quantity("Widget"), 0);
}

#[test]
fn test_inventory_remove_is_all_or_nothing() {
    let mut inventory = Inventory::new();
    inventory.add("Widget", 2);
    assert!(!inventory.remove("Widget", 5));
    assert_eq!(inventory.quantity("Widget"), 2);
    assert!(!inventory.remove("Sprocket", 1));

    assert_eq!(inventory.remove_up_to("Widget", 5), 2);
    assert!(inventory.is_empty());
}

#[test]
fn test_storage_entity_load_and_kind() {
    let mut shelf = StorageEntity::shelf(Cell::new(1, 1));
    shelf.add_item("Widget", 4);
    shelf.add_item("Gadget", 6);
    assert_eq!(shelf.load(), 10);
    assert!(!shelf.kind.is_station());
    assert!(StorageKind::ShippingStation.is_station());
    assert_eq!(StorageKind::ReceivingStation.to_string(), "receiving");
}

#[test]
fn test_task_chain_quantity_and_destination() {
    let mut task = transfer(1, Cell::new(6, 0), Cell::new(1, 3), "Widget", 2);
    assert!(task.is_pickup());
    assert_eq!(task.destination(), Cell::new(1, 3));

    task.set_quantity(7);
    assert_eq!(task.quantity, 7);
    let follow_up = task.take_follow_up().unwrap();
    assert_eq!(follow_up.quantity, 7);
    assert_eq!(follow_up.direction, TaskDirection::Dropoff);
    assert_eq!(task.destination(), Cell::new(6, 0));
}

#[test]
fn test_order_tagging_reaches_follow_up() {
    let task = transfer(1, Cell::new(1, 1), Cell::new(6, 10), "Gadget", 1).for_order(9);
    assert_eq!(task.order_id, Some(9));
    assert_eq!(task.follow_up.as_ref().and_then(|t| t.order_id), Some(9));
}

#[test]
fn test_order_merges_lines_and_counts_down() {
    let mut order = Order::new(1, vec![("Widget", 2), ("Gadget", 1), ("Widget", 3), ("Sprocket", 0)]);
    assert_eq!(order.line_items().len(), 2);
    assert_eq!(order.remaining("Widget"), 5);
    assert_eq!(order.total_units(), 6);
    assert_eq!(order.describe(), "1x Gadget, 5x Widget");

    order.register_fulfillment("Widget", 5);
    order.register_fulfillment("Toothpaste", 3);
    assert!(!order.is_complete());
    assert!(order.needs("Gadget"));

    order.register_fulfillment("Gadget", 4);
    assert!(order.is_complete());
    assert_eq!(order.remaining("Gadget"), 0);
    assert_eq!(order.line_items()["Gadget"], 1);
}

#[test]
fn test_robot_name_uses_role() {
    assert_eq!(Robot::new(0, RobotRole::Sorter, Cell::new(0, 0)).name, "Sorter #0");
    assert_eq!(Robot::new(3, RobotRole::Generic, Cell::new(0, 0)).name, "Robot #3");
}

#[test]
fn test_robot_pickup_then_dropoff_moves_stock() {
    let mut robot = Robot::new(1, RobotRole::Picker, Cell::new(2, 1));
    let mut shelf = StorageEntity::shelf(Cell::new(1, 1));
    shelf.add_item("Widget", 5);
    let mut station = StorageEntity::new(Cell::new(2, 4), StorageKind::ShippingStation);

    robot.assign(transfer(1, shelf.position, station.position, "Widget", 3));
    let pickup = robot.fulfill(&mut shelf).unwrap();
    assert!(pickup.applied);
    assert_eq!(shelf.quantity("Widget"), 2);
    assert_eq!(robot.inventory().quantity("Widget"), 3);
    assert_eq!(robot.current_task().map(|t| t.direction), Some(TaskDirection::Dropoff));

    let dropoff = robot.fulfill(&mut station).unwrap();
    assert!(dropoff.applied);
    assert_eq!(station.quantity("Widget"), 3);
    assert!(robot.inventory().is_empty());
    assert!(robot.is_available());
}

#[test]
fn test_short_pickup_changes_nothing_but_advances_chain() {
    let mut robot = Robot::new(1, RobotRole::Picker, Cell::new(2, 1));
    let mut shelf = StorageEntity::shelf(Cell::new(1, 1));
    shelf.add_item("Widget", 1);
    let mut station = StorageEntity::new(Cell::new(2, 4), StorageKind::ShippingStation);

    robot.assign(transfer(1, shelf.position, station.position, "Widget", 3));
    assert!(!robot.fulfill(&mut shelf).unwrap().applied);
    assert_eq!(shelf.quantity("Widget"), 1);

    // Nothing was carried, so the dropoff cannot apply either.
    assert!(!robot.fulfill(&mut station).unwrap().applied);
    assert_eq!(station.load(), 0);
    assert!(robot.fulfill(&mut station).is_none());
}

#[test]
fn test_goto_follows_planned_route() {
    let mut robot = Robot::new(0, RobotRole::Generic, Cell::new(0, 0));
    let oracle = FixedOracle::open(vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)]);

    assert_eq!(robot.goto(Cell::new(1, 2), &oracle), GotoOutcome::EnRoute);
    assert_eq!(robot.state(), RobotState::Moving);
    assert_eq!(robot.next_step(), Some(Cell::new(0, 1)));
    assert_eq!(robot.destination(), Some(Cell::new(0, 2)));

    assert!(!robot.advance());
    assert!(robot.advance());
    assert_eq!(robot.position(), Cell::new(0, 2));
    assert_eq!(robot.state(), RobotState::Idle);
}

#[test]
fn test_goto_distinguishes_blocked_from_unreachable() {
    let mut robot = Robot::new(0, RobotRole::Generic, Cell::new(0, 0));
    let blocked = FixedOracle {
        approach: Some(Cell::new(0, 3)),
        route: vec![],
        static_route: vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2), Cell::new(0, 3)],
    };
    assert_eq!(robot.goto(Cell::new(0, 3), &blocked), GotoOutcome::Blocked);
    assert!(robot.is_waiting_for_route());
    assert!(robot.path().is_empty());

    let walled = FixedOracle { approach: Some(Cell::new(0, 3)), route: vec![], static_route: vec![] };
    let outcome = robot.goto(Cell::new(0, 3), &walled);
    assert_eq!(outcome, GotoOutcome::Unreachable);
    assert!(!robot.is_waiting_for_route());
    assert_eq!(robot.state(), RobotState::Idle);

    let nowhere = FixedOracle { approach: None, route: vec![], static_route: vec![] };
    assert_eq!(robot.goto(Cell::new(0, 3), &nowhere), GotoOutcome::NoApproach);
}

#[test]
fn test_goto_current_cell_arrives_immediately() {
    let mut robot = Robot::new(0, RobotRole::Generic, Cell::new(2, 2));
    let oracle = FixedOracle::open(vec![Cell::new(2, 2)]);
    assert_eq!(robot.goto(Cell::new(2, 2), &oracle), GotoOutcome::Arrived);
    assert!(robot.path().is_empty());
}

#[test]
fn test_raise_task_quantity_only_matches_current_chain() {
    let mut robot = Robot::new(0, RobotRole::Sorter, Cell::new(0, 0));
    robot.assign(transfer(4, Cell::new(6, 0), Cell::new(1, 1), "Widget", 2));

    assert!(!robot.raise_task_quantity(99, 10));
    assert!(robot.raise_task_quantity(4, 6));
    let task = robot.current_task().unwrap();
    assert_eq!(task.quantity, 6);
    assert_eq!(task.follow_up.as_ref().map(|t| t.quantity), Some(6));

    let dropped = robot.abandon().unwrap();
    assert_eq!(dropped.id, 4);
    assert!(robot.is_available());
}

#[test]
fn test_waiting_robot_side_steps_and_keeps_its_goal() {
    let mut robot = Robot::new(0, RobotRole::Picker, Cell::new(0, 0));
    robot.assign(transfer(1, Cell::new(0, 4), Cell::new(2, 4), "Widget", 1));
    let blocked = FixedOracle {
        approach: Some(Cell::new(0, 3)),
        route: vec![],
        static_route: vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2), Cell::new(0, 3)],
    };
    assert_eq!(robot.goto(Cell::new(0, 4), &blocked), GotoOutcome::Blocked);
    assert!(robot.can_step_aside());

    robot.side_step(Cell::new(1, 0));
    assert!(robot.is_detouring());
    assert!(!robot.is_waiting_for_route());
    assert!(!robot.can_step_aside());
    assert_eq!(robot.destination(), Some(Cell::new(0, 3)));

    assert!(robot.advance());
    assert_eq!(robot.position(), Cell::new(1, 0));
    assert!(robot.is_waiting_for_route());

    let open = FixedOracle::open(vec![Cell::new(1, 0), Cell::new(1, 1), Cell::new(0, 1), Cell::new(0, 2), Cell::new(0, 3)]);
    assert_eq!(robot.replan(&open, None), GotoOutcome::EnRoute);
    assert_eq!(robot.destination(), Some(Cell::new(0, 3)));
    assert!(!robot.is_detouring());
}

#[test]
fn test_cancelled_detour_returns_to_waiting() {
    let mut robot = Robot::new(0, RobotRole::Picker, Cell::new(0, 0));
    robot.assign(transfer(1, Cell::new(0, 4), Cell::new(2, 4), "Widget", 1));
    let blocked = FixedOracle {
        approach: Some(Cell::new(0, 3)),
        route: vec![],
        static_route: vec![Cell::new(0, 0), Cell::new(0, 3)],
    };
    robot.goto(Cell::new(0, 4), &blocked);
    robot.side_step(Cell::new(1, 0));
    robot.cancel_detour();

    assert_eq!(robot.position(), Cell::new(0, 0));
    assert!(robot.is_waiting_for_route());
    assert!(robot.current_task().is_some());
}

#[test]
fn test_idle_robot_finishes_side_step_before_new_work() {
    let mut robot = Robot::new(0, RobotRole::Generic, Cell::new(0, 0));
    assert!(robot.is_available());
    assert!(robot.can_step_aside());

    robot.side_step(Cell::new(0, 1));
    assert!(!robot.is_available());
    assert!(!robot.is_detouring());

    assert!(robot.advance());
    assert!(robot.is_available());
    assert_eq!(robot.position(), Cell::new(0, 1));
}
